// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic pass-through gateway.
//!
//! Forwards the caller's own fields, minus the engine's control parameters,
//! to the tenant's URL. The selected message replaces the tenant's message
//! field.

use cabreview_core::types::{
    EMPTY_SUCCESS_SENTINEL, HttpMethod, InboundEvent, OutboundRequest, TenantConfig,
};

pub fn build(tenant: &TenantConfig, event: &InboundEvent, message: &str) -> OutboundRequest {
    let mut form_params = event.forwarded_params();
    if !message.is_empty() && !tenant.message_parameter.is_empty() {
        form_params.insert(tenant.message_parameter.clone(), message.to_string());
    }
    OutboundRequest {
        url: tenant.delivery.send_url.clone(),
        method: if tenant.delivery.http_get {
            HttpMethod::Get
        } else {
            HttpMethod::Post
        },
        form_params,
        ..Default::default()
    }
}

/// Prefix match of the space-trimmed response against the expected string.
///
/// `EMPTY` expects a literal empty body. Any other expectation, including an
/// empty one, is a prefix test.
pub fn verify(expected: &str, response: &str) -> bool {
    if expected == EMPTY_SUCCESS_SENTINEL && response.is_empty() {
        return true;
    }
    response.trim_matches(' ').starts_with(expected)
}
