// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! reqwest-backed implementation of the [`Sender`](cabreview_core::Sender) trait.

pub mod client;

pub use client::HttpSender;
