// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message Media messaging API.
//!
//! The API key and secret arrive with the inbound event (`api_key`,
//! `api_secret`) and are sent as basic auth.

use cabreview_core::types::{HttpMethod, InboundEvent, OutboundRequest, TenantConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct Submission<'a> {
    messages: [SubmittedMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct SubmittedMessage<'a> {
    content: &'a str,
    destination_number: String,
    format: &'static str,
    delivery_report: &'static str,
}

#[derive(Debug, Deserialize)]
struct SubmissionResponse {
    #[serde(default)]
    messages: Vec<AcceptedMessage>,
}

#[derive(Debug, Deserialize)]
struct AcceptedMessage {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

pub fn build(
    tenant: &TenantConfig,
    event: &InboundEvent,
    telephone: &str,
    message: &str,
) -> OutboundRequest {
    let submission = Submission {
        messages: [SubmittedMessage {
            content: message,
            destination_number: format!("+{telephone}"),
            format: "SMS",
            delivery_report: "true",
        }],
    };
    OutboundRequest {
        url: tenant.delivery.send_url.clone(),
        method: HttpMethod::Post,
        basic_user: event.field("api_key").to_string(),
        basic_pass: event.field("api_secret").to_string(),
        json_body: serde_json::to_string(&submission).ok(),
        is_json: true,
        ..Default::default()
    }
}

/// The first returned message must have an id and be `queued`.
pub fn verify(response: &str) -> bool {
    let Ok(parsed) = serde_json::from_str::<SubmissionResponse>(response) else {
        return false;
    };
    parsed.messages.first().is_some_and(|m| {
        m.message_id.as_deref().is_some_and(|id| !id.is_empty())
            && m.status.as_deref() == Some("queued")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_single_message_submission() {
        let mut tenant = TenantConfig::default();
        tenant.delivery.send_url = "https://api.messagemedia.example/v1/messages".into();
        let event = InboundEvent::new()
            .with("api_key", "mm-key")
            .with("api_secret", "mm-secret");

        let request = build(&tenant, &event, "61412345678", "Thanks!");
        let body: serde_json::Value =
            serde_json::from_str(request.json_body.as_deref().unwrap()).unwrap();

        assert_eq!(body["messages"][0]["content"], "Thanks!");
        assert_eq!(body["messages"][0]["destination_number"], "+61412345678");
        assert_eq!(body["messages"][0]["format"], "SMS");
        assert_eq!(body["messages"][0]["delivery_report"], "true");
        assert_eq!(request.basic_user, "mm-key");
        assert_eq!(request.basic_pass, "mm-secret");
        assert!(request.is_json);
    }

    #[test]
    fn verify_checks_first_message() {
        assert!(verify(
            r#"{"messages":[{"message_id":"04fe9a97","status":"queued","content":"x"}]}"#
        ));
        assert!(!verify(r#"{"messages":[{"status":"queued"}]}"#));
        assert!(!verify(r#"{"messages":[{"message_id":"","status":"queued"}]}"#));
        assert!(!verify(r#"{"messages":[{"message_id":"04fe9a97","status":"failed"}]}"#));
        assert!(!verify(r#"{"messages":[]}"#));
        assert!(!verify(""));
    }
}
