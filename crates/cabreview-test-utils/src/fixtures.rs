// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenant and timestamp fixtures.

use cabreview_core::types::{
    ClientId, DeliverySettings, DispatcherSettings, MessageSettings, Schedule, TenantConfig,
};
use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp into UTC. Panics on malformed input.
pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .unwrap_or_else(|e| panic!("bad fixture timestamp {s:?}: {e}"))
        .with_timezone(&Utc)
}

/// A window open all day, every day, in UTC.
pub fn always_open() -> Schedule {
    Schedule {
        enabled: true,
        start: "00:00".into(),
        end: "23:59".into(),
        time_zone: "UTC".into(),
        monday: true,
        tuesday: true,
        wednesday: true,
        thursday: true,
        friday: true,
        saturday: true,
        sunday: true,
    }
}

/// A GB tenant delivering through the generic pass-through backend.
///
/// Reads the telephone from `tel` and the message from `msg`, expects `OK`
/// from the gateway, and allows 3 sends per number at most every 30 days.
pub fn generic_tenant(client_id: ClientId, token: &str) -> TenantConfig {
    TenantConfig {
        client_id,
        token: token.to_string(),
        country: "GB".into(),
        min_send_frequency_days: 30,
        max_send_count: 3,
        max_daily_send_count: 100,
        telephone_parameter: "tel".into(),
        message_parameter: "msg".into(),
        app_key: String::new(),
        secret_key: String::new(),
        schedules: vec![always_open()],
        message: MessageSettings::default(),
        delivery: DeliverySettings {
            send_url: "https://sms.example.com/send".into(),
            send_success_response: "OK".into(),
            ..Default::default()
        },
        dispatcher: DispatcherSettings::default(),
    }
}

/// A "CAB 9" tenant delivering through the Review-Master gateway.
///
/// Timing thresholds are (10, 15, 5) minutes and the tenant message is used.
pub fn cab9_tenant(client_id: ClientId, token: &str) -> TenantConfig {
    let mut tenant = generic_tenant(client_id, token);
    tenant.message.use_database_message = true;
    tenant.message.message = "Thanks for riding with us, review us at https://r.example/x".into();
    tenant.delivery.review_master_enabled = true;
    tenant.dispatcher = DispatcherSettings {
        checks_enabled: true,
        dispatcher_type: "CAB 9".into(),
        is_booking_for_now_diff_minutes: 10,
        now_pickup_to_contact_minutes: 15,
        pre_booking_pickup_to_contact_minutes: 5,
        ..Default::default()
    };
    tenant
}

/// A "CORDIC" tenant keyed by passenger id.
pub fn cordic_tenant(client_id: ClientId, token: &str) -> TenantConfig {
    let mut tenant = cab9_tenant(client_id, token);
    tenant.delivery.review_master_enabled = false;
    tenant.dispatcher.dispatcher_type = "CORDIC".into();
    tenant
}
