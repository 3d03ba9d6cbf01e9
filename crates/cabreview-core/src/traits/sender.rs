// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound HTTP collaborator.

use async_trait::async_trait;

use crate::types::OutboundRequest;

/// Performs one outbound HTTP request and returns the raw response text.
///
/// An empty string means either a transport failure or a legitimately empty
/// response body; callers cannot tell the two apart. Implementations never
/// retry.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> String;
}
