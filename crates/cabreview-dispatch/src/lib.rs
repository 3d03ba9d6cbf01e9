// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review-request dispatch decision engine.
//!
//! Given a completed-trip event, decides whether a "leave us a review"
//! message goes out, builds the request for the tenant's delivery backend,
//! and enforces per-tenant rate limits.
//!
//! The pieces, leaves first:
//!
//! - [`telephone`] - canonical number for a country, `""` when not a mobile
//! - [`barred`] - prefix block list loaded at startup
//! - [`message`] - message text and multi-message selection
//! - [`timing`] - dispatcher pickup-timing checks, including booking lookups
//! - [`throttle`] - send window, daily cap, stop flag, frequency and count
//! - [`gateway`] - per-backend request building and response verification
//! - [`scheduler`] - immediate send or persisted deferred send
//! - [`engine`] - the orchestration of all of the above

pub mod barred;
pub mod engine;
pub mod gateway;
pub mod message;
pub mod queue;
pub mod scheduler;
pub mod telephone;
pub mod throttle;
pub mod timing;

pub use barred::BarredPrefixes;
pub use engine::DispatchEngine;
pub use gateway::{Gateway, ReviewMasterEndpoint};
pub use queue::MasterQueue;
