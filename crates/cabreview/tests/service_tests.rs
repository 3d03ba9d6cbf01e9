// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-stack scenarios: SQLite store, HTTP sender, and mock gateways.

use std::sync::Arc;
use std::time::Duration;

use cabreview_config::model::StorageConfig;
use cabreview_core::Store;
use cabreview_core::types::{DispatchStatus, InboundEvent, Integration, RejectReason, TenantConfig};
use cabreview_dispatch::{BarredPrefixes, DispatchEngine, MasterQueue, ReviewMasterEndpoint};
use cabreview_storage::SqliteStore;
use cabreview_storage::queries::{stats, tenants};
use cabreview_test_utils::fixtures::generic_tenant;
use cabreview_transport::HttpSender;
use chrono::Utc;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn engine_with(dir: &tempfile::TempDir, tenant: &TenantConfig) -> (Arc<SqliteStore>, DispatchEngine) {
    let store = SqliteStore::new(StorageConfig {
        database_path: dir.path().join("cabreview.db").display().to_string(),
    });
    store.initialize().await.unwrap();
    let db = store.database().unwrap();
    tenants::upsert_client(db, tenant.client_id, "Acme Cars", &tenant.country, true)
        .await
        .unwrap();
    tenants::upsert_tenant_config(db, tenant, true).await.unwrap();

    let store = Arc::new(store);
    let engine = DispatchEngine::new(
        store.clone(),
        Arc::new(HttpSender::new(Duration::from_secs(5)).unwrap()),
        Arc::new(BarredPrefixes::default()),
        Arc::new(MasterQueue::default()),
        ReviewMasterEndpoint::default(),
    );
    (store, engine)
}

fn event() -> InboundEvent {
    InboundEvent::new()
        .with("gr_token", "tok")
        .with("tel", "07123456789")
        .with("msg", "How was your ride?")
        .with("trip_id", "T-1")
}

fn with_booking_lookup(mut tenant: TenantConfig, dispatcher_url: String) -> TenantConfig {
    tenant.app_key = "ak".into();
    tenant.secret_key = "sk".into();
    tenant.dispatcher.checks_enabled = true;
    tenant.dispatcher.url = dispatcher_url;
    tenant.dispatcher.booking_id_parameter = "trip_id".into();
    tenant.dispatcher.is_booking_for_now_diff_minutes = 10;
    tenant.dispatcher.now_pickup_to_contact_minutes = 15;
    tenant.dispatcher.pre_booking_pickup_to_contact_minutes = 5;
    tenant
}

fn booking(code: &str) -> serde_json::Value {
    serde_json::json!({
        "code": code,
        "body": {"booking": {
            "status": "COMPLETED",
            "created_date": "2026-03-02T09:30:00Z",
            "pickup_date": "2026-03-02T09:32:00Z",
            "contact_date": "2026-03-02T09:40:00Z",
        }}
    })
}

#[tokio::test]
async fn generic_send_is_throttled_on_repeat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(body_string_contains("tel=07123456789"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK queued"))
        .expect(1)
        .mount(&server)
        .await;

    let mut tenant = generic_tenant(7, "tok");
    tenant.delivery.send_url = format!("{}/send", server.uri());
    let dir = tempfile::tempdir().unwrap();
    let (store, engine) = engine_with(&dir, &tenant).await;

    let first = engine.dispatch(Integration::Generic, &event()).await;
    assert_eq!(first.status, DispatchStatus::Sent);
    assert_eq!(first.body, "OK");

    let record = store.fetch_last_sent("447123456789", 7).await.unwrap().unwrap();
    assert_eq!(record.sent_count, 1);

    let second = engine.dispatch(Integration::Generic, &event()).await;
    assert_eq!(
        second.status,
        DispatchStatus::NotEligible(RejectReason::SentTooRecently)
    );
    assert_eq!(second.body, r#"{"success":"0"}"#);

    let counters = stats::fetch_stats(store.database().unwrap(), 7, Utc::now().date_naive())
        .await
        .unwrap();
    assert_eq!((counters.requested_count, counters.sent_count), (2, 1));
}

#[tokio::test]
async fn booking_lookup_passes_before_delivery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookings/index/T-1"))
        .and(header("authorization", "Basic YWs6c2s="))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking("0")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let mut tenant = with_booking_lookup(generic_tenant(7, "tok"), server.uri());
    tenant.delivery.send_url = format!("{}/send", server.uri());
    let dir = tempfile::tempdir().unwrap();
    let (_store, engine) = engine_with(&dir, &tenant).await;

    let outcome = engine.dispatch(Integration::Generic, &event()).await;
    assert_eq!(outcome.status, DispatchStatus::Sent);
}

#[tokio::test]
async fn failed_booking_lookup_blocks_delivery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookings/index/T-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking("1")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(0)
        .mount(&server)
        .await;

    let mut tenant = with_booking_lookup(generic_tenant(7, "tok"), format!("{}/", server.uri()));
    tenant.delivery.send_url = format!("{}/send", server.uri());
    let dir = tempfile::tempdir().unwrap();
    let (store, engine) = engine_with(&dir, &tenant).await;

    let outcome = engine.dispatch(Integration::Generic, &event()).await;
    assert_eq!(
        outcome.status,
        DispatchStatus::NotEligible(RejectReason::DispatcherTimingFailed)
    );
    assert!(store.fetch_last_sent("447123456789", 7).await.unwrap().is_none());
}

#[tokio::test]
async fn unreachable_gateway_is_a_send_failure() {
    let mut tenant = generic_tenant(7, "tok");
    tenant.delivery.send_url = "http://127.0.0.1:1/send".into();
    let dir = tempfile::tempdir().unwrap();
    let (store, engine) = engine_with(&dir, &tenant).await;

    let outcome = engine.dispatch(Integration::Generic, &event()).await;
    assert_eq!(outcome.status, DispatchStatus::SendFailed);
    assert_eq!(outcome.body, r#"{"success":"0"}"#);
    assert!(store.fetch_last_sent("447123456789", 7).await.unwrap().is_none());
}
