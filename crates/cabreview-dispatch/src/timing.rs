// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatcher timing verification.
//!
//! A review request is only relevant when the passenger was picked up close
//! to the booked time. "Now" bookings (booked for roughly when they were
//! made) and pre-bookings get separate tolerances. All comparisons use the
//! absolute difference and are inclusive. Any unparseable timestamp fails.

use cabreview_core::Sender;
use cabreview_core::types::{DispatcherSettings, HttpMethod, OutboundRequest};
use chrono::{DateTime, Duration, FixedOffset};
use serde::Deserialize;
use tracing::debug;

/// Tolerances in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingThresholds {
    /// Max gap between creation and booked-for time for a "now" booking.
    pub is_booking_for_now_diff: u32,
    /// Max pickup delay for a "now" booking.
    pub now_pickup_to_contact: u32,
    /// Max pickup delay for a pre-booking.
    pub pre_booking_pickup_to_contact: u32,
}

impl From<&DispatcherSettings> for TimingThresholds {
    fn from(settings: &DispatcherSettings) -> Self {
        Self {
            is_booking_for_now_diff: settings.is_booking_for_now_diff_minutes,
            now_pickup_to_contact: settings.now_pickup_to_contact_minutes,
            pre_booking_pickup_to_contact: settings.pre_booking_pickup_to_contact_minutes,
        }
    }
}

fn within(a: DateTime<FixedOffset>, b: DateTime<FixedOffset>, minutes: u32) -> bool {
    (a - b).abs() <= Duration::minutes(i64::from(minutes))
}

/// Check RFC 3339 creation, booked-for, and picked-up times against `thresholds`.
pub fn verify_timing(
    created: &str,
    booked_for: &str,
    picked_up: &str,
    thresholds: TimingThresholds,
) -> bool {
    let parsed = (
        DateTime::parse_from_rfc3339(created.trim()),
        DateTime::parse_from_rfc3339(booked_for.trim()),
        DateTime::parse_from_rfc3339(picked_up.trim()),
    );
    let (Ok(created), Ok(booked_for), Ok(picked_up)) = parsed else {
        debug!(created, booked_for, picked_up, "unparseable booking timestamp");
        return false;
    };

    let is_now = within(booked_for, created, thresholds.is_booking_for_now_diff);
    let contact_threshold = if is_now {
        thresholds.now_pickup_to_contact
    } else {
        thresholds.pre_booking_pickup_to_contact
    };
    within(picked_up, booked_for, contact_threshold)
}

/// Booking lookup endpoint for a trip.
pub fn booking_url(dispatcher_url: &str, trip_id: &str) -> String {
    let base = dispatcher_url.trim();
    if base.ends_with('/') {
        format!("{base}bookings/index/{trip_id}")
    } else {
        format!("{base}/bookings/index/{trip_id}")
    }
}

#[derive(Debug, Deserialize)]
struct BookingEnvelope {
    code: String,
    body: BookingBody,
}

#[derive(Debug, Deserialize)]
struct BookingBody {
    booking: Booking,
}

#[derive(Debug, Deserialize)]
struct Booking {
    #[serde(default)]
    status: String,
    #[serde(default)]
    created_date: String,
    #[serde(default)]
    pickup_date: String,
    #[serde(default)]
    contact_date: String,
}

/// Judge a booking lookup response.
///
/// Requires `code == "0"` and a `COMPLETED` booking, then checks the
/// created/pickup/contact dates as creation/booked-for/picked-up times.
pub fn check_booking_response(response: &str, thresholds: TimingThresholds) -> bool {
    let envelope: BookingEnvelope = match serde_json::from_str(response) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!(error = %e, "booking response is not the expected JSON");
            return false;
        }
    };
    if envelope.code != "0" {
        debug!(code = %envelope.code, "booking lookup returned an error code");
        return false;
    }
    let booking = envelope.body.booking;
    if booking.status != "COMPLETED" {
        debug!(status = %booking.status, "booking not completed");
        return false;
    }
    verify_timing(
        &booking.created_date,
        &booking.pickup_date,
        &booking.contact_date,
        thresholds,
    )
}

/// Fetch a booking from the dispatcher and verify its timing.
///
/// The lookup authenticates with the tenant's app key and secret over basic
/// auth. Transport failures arrive as an empty body and fail the check.
pub async fn verify_booking(
    sender: &dyn Sender,
    settings: &DispatcherSettings,
    app_key: &str,
    secret_key: &str,
    trip_id: &str,
) -> bool {
    let request = OutboundRequest {
        url: booking_url(&settings.url, trip_id),
        method: HttpMethod::Get,
        basic_user: app_key.to_string(),
        basic_pass: secret_key.to_string(),
        ..Default::default()
    };
    let response = sender.send(&request).await;
    let passed = check_booking_response(&response, TimingThresholds::from(settings));
    debug!(url = %request.url, trip_id, passed, "dispatcher booking checked");
    passed
}
