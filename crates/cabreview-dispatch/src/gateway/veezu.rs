// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Veezu messaging API.
//!
//! The transport reports any HTTP 200 from this service as
//! `{"success":"1"}`, so verification here mostly sees that literal.

use cabreview_core::types::{AlternateService, HttpMethod, OutboundRequest, TenantConfig};

pub fn build(tenant: &TenantConfig, telephone: &str, message: &str) -> OutboundRequest {
    let body = serde_json::json!({
        "message": message,
        "telephone": telephone,
    });
    OutboundRequest {
        url: tenant.delivery.send_url.clone(),
        method: HttpMethod::Post,
        json_body: Some(body.to_string()),
        is_json: true,
        variant_hint: Some(AlternateService::Veezu),
        variant_secret: tenant.delivery.alternate_service_secret1.trim().to_string(),
        ..Default::default()
    }
}

pub fn verify(response: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(response)
        .ok()
        .is_some_and(|v| v.get("success").and_then(|s| s.as_str()) == Some("1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_secret_for_auth_header() {
        let mut tenant = TenantConfig::default();
        tenant.delivery.send_url = "https://messages.veezu.example/api/messages".into();
        tenant.delivery.alternate_service_secret1 = " veezu-secret ".into();

        let request = build(&tenant, "447123456789", "Hi");
        assert_eq!(request.variant_secret, "veezu-secret");
        assert_eq!(request.headers()["auth_token"], "veezu-secret");
        let body: serde_json::Value =
            serde_json::from_str(request.json_body.as_deref().unwrap()).unwrap();
        assert_eq!(body["telephone"], "447123456789");
        assert_eq!(body["message"], "Hi");
    }

    #[test]
    fn verify_wants_success_one() {
        assert!(verify(r#"{"success":"1"}"#));
        assert!(!verify(r#"{"success":"0"}"#));
        assert!(!verify(""));
    }
}
