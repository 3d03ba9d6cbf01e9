// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. Each function takes a [`Database`](crate::Database)
//! handle and runs on its background connection thread.

pub mod last_sent;
pub mod master_queue;
pub mod send_later;
pub mod stats;
pub mod tenants;
