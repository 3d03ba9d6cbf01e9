// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Cabreview workspace.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Tenant (client company) identifier. Zero means "unknown client".
pub type ClientId = u64;

/// Inbound field carrying the tenant token.
pub const TOKEN_PARAM: &str = "gr_token";

/// Override flag skipping the stored-record checks (stop, frequency, count).
pub const IGNORE_TELEPHONE_CHECKS: &str = "ignore_telephone_checks";

/// Override flag skipping dispatcher timing verification.
pub const IGNORE_DISPATCHER_CHECKS: &str = "ignore_dispatcher_checks";

/// Override flag skipping the send window and the daily cap.
pub const IGNORE_TIME_AND_SENT_COUNT_CHECKS: &str = "ignore_time_and_sent_count_checks";

/// Passenger-keyed override flag equivalent to [`IGNORE_TELEPHONE_CHECKS`].
pub const IGNORE_PASSENGER_ID_CHECKS: &str = "ignore_passenger_id_checks";

/// Passenger key for passenger-ID based dispatch webhooks.
pub const PASSENGER_ID_PARAM: &str = "passenger_id";

/// Dispatch webhook timing fields (RFC 3339).
pub const BOOKING_CREATION_TIME_PARAM: &str = "booking_creation_time";
pub const BOOKED_FOR_TIME_PARAM: &str = "booked_for_time";
pub const PICKED_UP_TIME_PARAM: &str = "picked_up_time";

/// The engine's own control parameters, never forwarded to a gateway.
pub const CONTROL_PARAMS: [&str; 4] = [
    TOKEN_PARAM,
    IGNORE_TELEPHONE_CHECKS,
    IGNORE_DISPATCHER_CHECKS,
    IGNORE_TIME_AND_SENT_COUNT_CHECKS,
];

/// Configured success value meaning "expect a literal empty body".
pub const EMPTY_SUCCESS_SENTINEL: &str = "EMPTY";

/// The webhook family an inbound event arrived through.
///
/// Each integration has its own fixed response envelope.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Integration {
    /// Pass-through webhook with tenant-named fields.
    Generic,
    /// Form-based dispatch webhook ("CAB 9" dispatchers).
    Cab9,
    /// Passenger-ID based dispatch webhook ("CORDIC" dispatchers).
    Cordic,
}

impl Integration {
    /// The `dispatcher_type` a tenant must carry to use this integration, if any.
    pub fn required_dispatcher_type(&self) -> Option<&'static str> {
        match self {
            Integration::Generic => None,
            Integration::Cab9 => Some("CAB 9"),
            Integration::Cordic => Some("CORDIC"),
        }
    }

    /// Body returned for every rejection and delivery failure.
    pub fn failure_body(&self) -> String {
        match self {
            Integration::Generic | Integration::Cab9 => r#"{"success":"0"}"#.to_string(),
            Integration::Cordic => r#"{"message":""}"#.to_string(),
        }
    }

    /// Body returned when the event was sent (or deferred).
    pub fn success_body(&self, tenant: &TenantConfig, message: &str) -> String {
        match self {
            Integration::Generic => {
                let configured = &tenant.delivery.send_success_response;
                if configured == EMPTY_SUCCESS_SENTINEL {
                    String::new()
                } else {
                    configured.clone()
                }
            }
            Integration::Cab9 => r#"{"success":"1"}"#.to_string(),
            Integration::Cordic => serde_json::json!({ "message": message }).to_string(),
        }
    }
}

/// HTTP method used for an outbound request.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
}

/// Named third-party delivery service behind the "alternate service" flag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum AlternateService {
    #[strum(serialize = "Message Media")]
    MessageMedia,
    #[strum(serialize = "Veezu")]
    Veezu,
}

/// One send window row in the tenant's timezone.
///
/// A tenant may carry several rows; only enabled rows are consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub enabled: bool,
    /// Window start, `HH:MM`, inclusive.
    pub start: String,
    /// Window end, `HH:MM`, inclusive up to the exact minute boundary.
    pub end: String,
    /// IANA timezone name, e.g. `Europe/London`.
    pub time_zone: String,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

/// Where the message text comes from and how it is picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSettings {
    /// Use [`MessageSettings::message`] instead of the inbound message field.
    pub use_database_message: bool,
    /// Tenant-stored message text.
    pub message: String,
    /// Pick one segment at random from a separator-joined message.
    pub multi_message_enabled: bool,
    pub multi_message_separator: String,
}

/// Delivery backend selection and parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySettings {
    /// Target URL for the generic, Message Media, and Veezu backends; base URL for iCabbi.
    pub send_url: String,
    /// Generic backend uses GET with a query string instead of a form POST.
    pub http_get: bool,
    /// Expected prefix of a successful generic response (`EMPTY` for an empty body).
    pub send_success_response: String,
    pub send_from_icabbi_app: bool,
    pub review_master_enabled: bool,
    pub review_master_use_master_queue: bool,
    pub review_master_pair_code: String,
    pub alternate_service_enabled: bool,
    /// Service name, see [`AlternateService`].
    pub alternate_service: String,
    pub alternate_service_secret1: String,
    pub replace_telephone_country_code: bool,
    pub replace_telephone_country_code_with: String,
    pub send_delay_enabled: bool,
    pub send_delay_minutes: u32,
}

/// Dispatcher timing verification settings. Thresholds are in minutes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherSettings {
    pub checks_enabled: bool,
    pub url: String,
    /// e.g. `CAB 9`, `CORDIC`, `ICABBI`.
    pub dispatcher_type: String,
    /// Inbound field carrying the trip ID for booking lookups.
    pub booking_id_parameter: String,
    pub is_booking_for_now_diff_minutes: u32,
    pub now_pickup_to_contact_minutes: u32,
    pub pre_booking_pickup_to_contact_minutes: u32,
}

/// Snapshot of one tenant's review-request policy, read fresh per event.
///
/// The `Default` value is the "zero" tenant (`client_id == 0`), which the
/// engine treats as "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
    pub client_id: ClientId,
    pub token: String,
    /// ISO-3166 alpha-2 country used for telephone normalization.
    pub country: String,
    pub min_send_frequency_days: u32,
    pub max_send_count: u32,
    pub max_daily_send_count: u32,
    /// Inbound field carrying the customer's telephone.
    pub telephone_parameter: String,
    /// Inbound field carrying the message (and the forwarded message field name).
    pub message_parameter: String,
    /// iCabbi application key, used for sending and for booking lookups.
    pub app_key: String,
    /// iCabbi secret key, used for sending and for booking lookups.
    pub secret_key: String,
    /// Send windows; the tenant is open when any enabled row is.
    pub schedules: Vec<Schedule>,
    pub message: MessageSettings,
    pub delivery: DeliverySettings,
    pub dispatcher: DispatcherSettings,
}

/// Durable throttle state for one (telephone, client) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSentRecord {
    pub telephone: String,
    pub client_id: ClientId,
    pub last_sent: DateTime<Utc>,
    pub last_sent_date: NaiveDate,
    pub sent_count: u32,
    pub stop: bool,
}

/// A fully built request persisted for a separate delayed-delivery worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendLaterEntry {
    pub telephone: String,
    pub client_id: ClientId,
    pub send_after: DateTime<Utc>,
    pub url: String,
    pub method: HttpMethod,
    pub basic_user: String,
    pub basic_pass: String,
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub body: Option<String>,
    pub send_from_icabbi_app: bool,
    pub review_master_enabled: bool,
    pub alternate_service_enabled: bool,
    pub alternate_service: String,
    pub success_response: String,
    pub max_daily_send_count: u32,
}

/// Pairing-code lookup result for the Review-Master gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairedTenant {
    pub client_id: ClientId,
    pub use_master_queue: bool,
}

/// Daily per-client counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub requested_count: u32,
    pub sent_count: u32,
}

/// One request for the [`Sender`](crate::traits::Sender) collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRequest {
    pub url: String,
    pub method: HttpMethod,
    /// Basic-auth user; only applied together with a non-empty password.
    pub basic_user: String,
    pub basic_pass: String,
    /// Review-Master `api-token` header. Non-empty forces a JSON request.
    pub api_token: String,
    /// Form (POST) or query-string (GET) parameters.
    pub form_params: BTreeMap<String, String>,
    pub json_body: Option<String>,
    pub is_json: bool,
    /// Named service needing transport-level special cases.
    pub variant_hint: Option<AlternateService>,
    /// Service secret sent as a header (Veezu `auth_token`).
    pub variant_secret: String,
}

impl OutboundRequest {
    /// The headers the transport will send for this request.
    ///
    /// Used to serialize deferred requests so a separate worker can replay them.
    pub fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        if !self.api_token.is_empty() {
            headers.insert("Content-Type".into(), "application/json".into());
            headers.insert("Accept".into(), "application/json".into());
            headers.insert("api-token".into(), self.api_token.clone());
            return headers;
        }
        if self.variant_hint == Some(AlternateService::Veezu) {
            if !self.variant_secret.is_empty() {
                headers.insert("auth_token".into(), self.variant_secret.clone());
            }
            headers.insert(
                "Content-Type".into(),
                "application/json; charset=utf-8".into(),
            );
            headers.insert("Accept".into(), "application/json".into());
        } else if self.is_json {
            headers.insert("Content-Type".into(), "application/json".into());
            headers.insert("Accept".into(), "application/json".into());
        } else if self.method == HttpMethod::Post {
            headers.insert(
                "Content-Type".into(),
                "application/x-www-form-urlencoded".into(),
            );
        } else {
            headers.insert("Content-Type".into(), "text/plain".into());
        }
        headers
    }
}

/// An inbound trip-completed event as a flat set of string fields.
///
/// Field order is not significant; keys are kept sorted so forwarded
/// parameters encode deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InboundEvent {
    params: BTreeMap<String, String>,
}

impl InboundEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Trimmed value of a field, or `""` when absent.
    pub fn field(&self, name: &str) -> &str {
        self.params.get(name).map(|v| v.trim()).unwrap_or("")
    }

    /// True when a field is present with the value `1`.
    pub fn flag(&self, name: &str) -> bool {
        self.field(name) == "1"
    }

    pub fn token(&self) -> &str {
        self.field(TOKEN_PARAM)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// All fields except the engine's control parameters.
    pub fn forwarded_params(&self) -> BTreeMap<String, String> {
        self.params
            .iter()
            .filter(|(k, _)| !CONTROL_PARAMS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl FromIterator<(String, String)> for InboundEvent {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

/// Why an event was judged not eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
    UnknownToken,
    WrongDispatcherType,
    InvalidTelephone,
    MissingPassengerId,
    Barred,
    OutsideSendWindow,
    DailyCapReached,
    Stopped,
    SentTooRecently,
    MaxSendCountReached,
    EmptyMessage,
    MissingTimingField,
    DispatcherTimingFailed,
    NoDeliveryBackend,
}

/// Final disposition of one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Delivered and verified (or recorded directly, for passenger-keyed events).
    Sent,
    /// Persisted for the delayed-delivery worker; success is assumed.
    Deferred,
    NotEligible(RejectReason),
    /// Transport failure or a response that failed verification.
    SendFailed,
}

/// Disposition plus the literal response body for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub status: DispatchStatus,
    pub body: String,
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        self.status == DispatchStatus::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn integration_parses_from_cli_names() {
        assert_eq!(Integration::from_str("generic").unwrap(), Integration::Generic);
        assert_eq!(Integration::from_str("cab9").unwrap(), Integration::Cab9);
        assert_eq!(Integration::from_str("cordic").unwrap(), Integration::Cordic);
        assert!(Integration::from_str("autocab").is_err());
    }

    #[test]
    fn response_envelopes_are_literal() {
        let mut tenant = TenantConfig::default();
        tenant.delivery.send_success_response = "OK".into();

        assert_eq!(Integration::Generic.success_body(&tenant, "hi"), "OK");
        assert_eq!(Integration::Generic.failure_body(), r#"{"success":"0"}"#);
        assert_eq!(Integration::Cab9.success_body(&tenant, "hi"), r#"{"success":"1"}"#);
        assert_eq!(Integration::Cab9.failure_body(), r#"{"success":"0"}"#);
        assert_eq!(
            Integration::Cordic.success_body(&tenant, "Rate us"),
            r#"{"message":"Rate us"}"#
        );
        assert_eq!(Integration::Cordic.failure_body(), r#"{"message":""}"#);
    }

    #[test]
    fn empty_sentinel_maps_to_empty_body() {
        let mut tenant = TenantConfig::default();
        tenant.delivery.send_success_response = EMPTY_SUCCESS_SENTINEL.into();
        assert_eq!(Integration::Generic.success_body(&tenant, "x"), "");
    }

    #[test]
    fn alternate_service_names_match_stored_values() {
        assert_eq!(
            AlternateService::from_str("Message Media").unwrap(),
            AlternateService::MessageMedia
        );
        assert_eq!(AlternateService::from_str("Veezu").unwrap(), AlternateService::Veezu);
        assert_eq!(AlternateService::MessageMedia.to_string(), "Message Media");
    }

    #[test]
    fn inbound_event_trims_fields_and_drops_control_params() {
        let event = InboundEvent::new()
            .with(TOKEN_PARAM, " tok ")
            .with(IGNORE_TELEPHONE_CHECKS, "1")
            .with("tel", " 07123456789 ")
            .with("msg", "hello");

        assert_eq!(event.token(), "tok");
        assert!(event.flag(IGNORE_TELEPHONE_CHECKS));
        assert!(!event.flag(IGNORE_DISPATCHER_CHECKS));
        assert_eq!(event.field("tel"), "07123456789");
        assert_eq!(event.field("missing"), "");

        let forwarded = event.forwarded_params();
        assert_eq!(forwarded.len(), 2);
        assert!(forwarded.contains_key("tel"));
        assert!(!forwarded.contains_key(TOKEN_PARAM));
    }

    #[test]
    fn headers_follow_request_shape() {
        let review_master = OutboundRequest {
            api_token: "secret".into(),
            is_json: true,
            ..Default::default()
        };
        assert_eq!(review_master.headers()["api-token"], "secret");

        let veezu = OutboundRequest {
            is_json: true,
            variant_hint: Some(AlternateService::Veezu),
            variant_secret: "s1".into(),
            ..Default::default()
        };
        let headers = veezu.headers();
        assert_eq!(headers["auth_token"], "s1");
        assert_eq!(headers["Content-Type"], "application/json; charset=utf-8");

        let form = OutboundRequest::default();
        assert_eq!(
            form.headers()["Content-Type"],
            "application/x-www-form-urlencoded"
        );

        let get = OutboundRequest {
            method: HttpMethod::Get,
            ..Default::default()
        };
        assert_eq!(get.headers()["Content-Type"], "text/plain");
    }

    #[test]
    fn http_method_displays_uppercase() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::from_str("POST").unwrap(), HttpMethod::Post);
    }
}
