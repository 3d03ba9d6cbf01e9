// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock sender for deterministic testing.
//!
//! `MockSender` implements `Sender` with pre-configured responses and
//! captures every request for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use cabreview_core::Sender;
use cabreview_core::types::OutboundRequest;

/// A mock sender that returns pre-configured response bodies.
///
/// Responses are popped from a FIFO queue. When the queue is empty the
/// default response is returned (`""` unless set, i.e. a transport failure).
pub struct MockSender {
    responses: Arc<Mutex<VecDeque<String>>>,
    default_response: String,
    requests: Arc<Mutex<Vec<OutboundRequest>>>,
}

impl MockSender {
    /// Create a mock sender with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            default_response: String::new(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock sender pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Self::new()
        }
    }

    /// Response returned once the queue is drained.
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    /// All requests passed to `send()`, in order.
    pub async fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of requests passed to `send()`.
    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sender for MockSender {
    async fn send(&self, request: &OutboundRequest) -> String {
        self.requests.lock().await.push(request.clone());
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pops_responses_then_falls_back_to_default() {
        let sender = MockSender::with_responses(vec!["first".into()]).with_default("OK");
        let request = OutboundRequest::default();

        assert_eq!(sender.send(&request).await, "first");
        assert_eq!(sender.send(&request).await, "OK");
        assert_eq!(sender.request_count().await, 2);
    }

    #[tokio::test]
    async fn empty_queue_without_default_is_a_failure() {
        let sender = MockSender::new();
        assert_eq!(sender.send(&OutboundRequest::default()).await, "");
    }
}
