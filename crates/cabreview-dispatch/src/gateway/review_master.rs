// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review-Master SMS gateway.
//!
//! JSON POST `{"queue_id", "telephone", "message"}` authenticated with an
//! `api-token` header. The queue is the tenant's own (its client id) or the
//! shared master queue handed out during pairing.

use cabreview_core::types::{HttpMethod, OutboundRequest};

/// Gateway endpoint plus the queue this delivery targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewMaster {
    pub url: String,
    pub api_token: String,
    pub queue_id: u64,
}

impl ReviewMaster {
    pub fn build(&self, telephone: &str, message: &str) -> OutboundRequest {
        let body = serde_json::json!({
            "queue_id": self.queue_id.to_string(),
            "telephone": format!("+{telephone}"),
            "message": message,
        });
        OutboundRequest {
            url: self.url.clone(),
            method: HttpMethod::Post,
            api_token: self.api_token.clone(),
            json_body: Some(body.to_string()),
            is_json: true,
            ..Default::default()
        }
    }
}

/// A queued message comes back as a JSON object with an `id`.
pub fn verify(response: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(response)
        .ok()
        .and_then(|v| v.as_object().map(|obj| obj.contains_key("id")))
        .unwrap_or(false)
}
