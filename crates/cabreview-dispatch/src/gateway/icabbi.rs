// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! iCabbi passenger app messaging (`sms/add`).

use std::collections::BTreeMap;

use cabreview_core::types::{HttpMethod, OutboundRequest, TenantConfig};

pub fn build(tenant: &TenantConfig, telephone: &str, message: &str) -> OutboundRequest {
    let base = tenant.delivery.send_url.trim();
    let url = if base.ends_with('/') {
        format!("{base}sms/add")
    } else {
        format!("{base}/sms/add")
    };
    let form_params = BTreeMap::from([
        ("app_key".to_string(), tenant.app_key.clone()),
        ("secret_key".to_string(), tenant.secret_key.clone()),
        ("recipient".to_string(), telephone.to_string()),
        ("body".to_string(), message.to_string()),
    ]);
    OutboundRequest {
        url,
        method: HttpMethod::Post,
        form_params,
        ..Default::default()
    }
}

/// Success is `"code": "0"`; failures carry a numeric HTTP-style code.
pub fn verify(response: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(response)
        .ok()
        .is_some_and(|v| v.get("code").and_then(|c| c.as_str()) == Some("0"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posts_form_to_sms_add() {
        let mut tenant = TenantConfig::default();
        tenant.delivery.send_url = "https://api.icabbi.example".into();
        tenant.app_key = "ak".into();
        tenant.secret_key = "sk".into();

        let request = build(&tenant, "447123456789", "Rate us");
        assert_eq!(request.url, "https://api.icabbi.example/sms/add");
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.form_params["recipient"], "447123456789");
        assert_eq!(request.form_params["body"], "Rate us");
        assert_eq!(request.form_params["app_key"], "ak");
        assert_eq!(request.form_params["secret_key"], "sk");
        assert!(!request.is_json);
    }

    #[test]
    fn verify_wants_string_zero() {
        assert!(verify(r#"{"code":"0","body":{}}"#));
        assert!(!verify(r#"{"code":404}"#));
        assert!(!verify(r#"{"code":0}"#));
        assert!(!verify("not json"));
    }
}
