// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Cabreview review-request dispatch engine.
//!
//! This crate provides the error type, the domain types, and the two
//! collaborator traits ([`Store`] and [`Sender`]) that the dispatch engine is
//! written against. Storage and transport crates implement the traits.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CabreviewError;
pub use traits::{Sender, Store};
pub use types::{
    ClientId, DispatchOutcome, DispatchStatus, InboundEvent, Integration, LastSentRecord,
    OutboundRequest, RejectReason, SendLaterEntry, TenantConfig,
};
