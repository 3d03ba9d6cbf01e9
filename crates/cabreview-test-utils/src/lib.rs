// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Cabreview integration tests.
//!
//! Provides in-memory collaborators and fixtures for fast, deterministic,
//! CI-runnable tests without a database or network.
//!
//! # Components
//!
//! - [`MemoryStore`] - `Store` backed by in-process maps, with inspection helpers
//! - [`MockSender`] - `Sender` with scripted responses and captured requests
//! - [`fixtures`] - tenant and timestamp builders

pub mod fixtures;
pub mod memory_store;
pub mod mock_sender;

pub use memory_store::MemoryStore;
pub use mock_sender::MockSender;
