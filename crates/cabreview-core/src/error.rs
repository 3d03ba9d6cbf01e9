// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Cabreview dispatch engine.

use thiserror::Error;

/// The primary error type used across the collaborator traits and core operations.
///
/// Rejections of an inbound event are not errors: they are reported through
/// [`DispatchStatus::NotEligible`](crate::types::DispatchStatus). This type covers
/// the failures of the surrounding machinery (storage, HTTP, event decoding).
#[derive(Debug, Error)]
pub enum CabreviewError {
    /// Storage backend errors (database open, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound HTTP errors (client construction, invalid URL or header value).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An inbound event could not be decoded into string fields.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CabreviewError {
    /// Wraps any storage-layer error.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }
}
