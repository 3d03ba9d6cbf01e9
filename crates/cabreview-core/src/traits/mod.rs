// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits the dispatch engine is written against.
//!
//! Both traits use `#[async_trait]` so they can be held as trait objects
//! (`Arc<dyn Store>`, `Arc<dyn Sender>`).

pub mod sender;
pub mod store;

pub use sender::Sender;
pub use store::Store;
