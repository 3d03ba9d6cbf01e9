// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HttpSender against a mock HTTP server.

use std::time::Duration;

use cabreview_core::Sender;
use cabreview_core::types::{AlternateService, HttpMethod, OutboundRequest};
use cabreview_transport::HttpSender;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sender() -> HttpSender {
    HttpSender::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn form_post_sends_urlencoded_params() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("msg=Rate+us%21&tel=07123456789"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK 1 queued"))
        .expect(1)
        .mount(&server)
        .await;

    let request = OutboundRequest {
        url: format!("{}/send", server.uri()),
        form_params: [
            ("tel".to_string(), "07123456789".to_string()),
            ("msg".to_string(), "Rate us!".to_string()),
        ]
        .into(),
        ..Default::default()
    };
    assert_eq!(sender().send(&request).await, "OK 1 queued");
}

#[tokio::test]
async fn get_sends_params_as_query_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookings/index/T-77"))
        .and(query_param("expand", "1"))
        .and(header("authorization", "Basic YWs6c2s="))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"code":"0"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let request = OutboundRequest {
        url: format!("{}/bookings/index/T-77", server.uri()),
        method: HttpMethod::Get,
        basic_user: "ak".into(),
        basic_pass: "sk".into(),
        form_params: [("expand".to_string(), "1".to_string())].into(),
        ..Default::default()
    };
    assert_eq!(sender().send(&request).await, r#"{"code":"0"}"#);
}

#[tokio::test]
async fn review_master_posts_json_with_api_token() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "queue_id": "8",
        "telephone": "+447123456789",
        "message": "Hello",
    });
    Mock::given(method("POST"))
        .and(path("/api/messages"))
        .and(header("api-token", "rm-token"))
        .and(header("accept", "application/json"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":5501}"#))
        .expect(1)
        .mount(&server)
        .await;

    let request = OutboundRequest {
        url: format!("{}/api/messages", server.uri()),
        api_token: "rm-token".into(),
        json_body: Some(body.to_string()),
        is_json: true,
        ..Default::default()
    };
    assert_eq!(sender().send(&request).await, r#"{"id":5501}"#);
}

#[tokio::test]
async fn veezu_ok_status_is_reported_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("auth_token", "vz-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
        .mount(&server)
        .await;

    let request = OutboundRequest {
        url: format!("{}/messages", server.uri()),
        json_body: Some(r#"{"telephone":"07123456789","message":"Hi"}"#.into()),
        is_json: true,
        variant_hint: Some(AlternateService::Veezu),
        variant_secret: "vz-secret".into(),
        ..Default::default()
    };
    assert_eq!(sender().send(&request).await, r#"{"success":"1"}"#);
}

#[tokio::test]
async fn veezu_error_status_returns_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string(r#"{"success":"0"}"#))
        .mount(&server)
        .await;

    let request = OutboundRequest {
        url: format!("{}/messages", server.uri()),
        json_body: Some("{}".into()),
        is_json: true,
        variant_hint: Some(AlternateService::Veezu),
        ..Default::default()
    };
    assert_eq!(sender().send(&request).await, r#"{"success":"0"}"#);
}

#[tokio::test]
async fn error_status_body_is_returned_for_verification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("ERR internal"))
        .mount(&server)
        .await;

    let request = OutboundRequest {
        url: format!("{}/send", server.uri()),
        ..Default::default()
    };
    assert_eq!(sender().send(&request).await, "ERR internal");
}

#[tokio::test]
async fn timeout_reads_as_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("OK")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let request = OutboundRequest {
        url: format!("{}/send", server.uri()),
        ..Default::default()
    };
    let sender = HttpSender::new(Duration::from_millis(200)).unwrap();
    assert_eq!(sender.send(&request).await, "");
}
