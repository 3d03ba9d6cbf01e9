// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery backends.
//!
//! [`Gateway`] is selected once per event from the tenant's flags, in a fixed
//! priority order: Review-Master, iCabbi app, alternate service, generic. Each
//! variant builds the outbound request and judges the raw response; the
//! engine never looks inside either.

pub mod generic;
pub mod icabbi;
pub mod message_media;
pub mod review_master;
pub mod veezu;

use cabreview_core::types::{AlternateService, InboundEvent, OutboundRequest, TenantConfig};
use tracing::debug;

pub use review_master::ReviewMaster;

/// Review-Master endpoint shared by every tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewMasterEndpoint {
    pub url: String,
    pub api_token: String,
}

/// Everything a backend may read when building a request.
#[derive(Debug, Clone, Copy)]
pub struct Delivery<'a> {
    pub tenant: &'a TenantConfig,
    pub event: &'a InboundEvent,
    /// Number as the gateway should see it (country code possibly replaced).
    pub telephone: &'a str,
    pub message: &'a str,
}

/// The backend chosen for one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gateway {
    ReviewMaster(ReviewMaster),
    ICabbi,
    MessageMedia,
    Veezu,
    /// Pass-through; holds the tenant's expected success prefix.
    Generic { expected_success: String },
}

impl Gateway {
    /// Pick the backend for `tenant`.
    ///
    /// `master_queue_id` is used only when the tenant delivers through the
    /// Review-Master master queue. An unrecognised alternate service name
    /// falls through to the generic backend.
    pub fn select(
        tenant: &TenantConfig,
        message: &str,
        review_master: &ReviewMasterEndpoint,
        master_queue_id: u64,
    ) -> Self {
        let delivery = &tenant.delivery;
        if delivery.review_master_enabled {
            let queue_id = if delivery.review_master_use_master_queue {
                master_queue_id
            } else {
                tenant.client_id
            };
            return Gateway::ReviewMaster(ReviewMaster {
                url: review_master.url.clone(),
                api_token: review_master.api_token.clone(),
                queue_id,
            });
        }
        if delivery.send_from_icabbi_app && !message.is_empty() {
            return Gateway::ICabbi;
        }
        if delivery.alternate_service_enabled {
            match delivery.alternate_service.trim().parse::<AlternateService>() {
                Ok(AlternateService::MessageMedia) => return Gateway::MessageMedia,
                Ok(AlternateService::Veezu) => return Gateway::Veezu,
                Err(_) => debug!(
                    client_id = tenant.client_id,
                    service = %delivery.alternate_service,
                    "unknown alternate service, using generic delivery"
                ),
            }
        }
        Gateway::Generic {
            expected_success: delivery.send_success_response.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gateway::ReviewMaster(_) => "review_master",
            Gateway::ICabbi => "icabbi",
            Gateway::MessageMedia => "message_media",
            Gateway::Veezu => "veezu",
            Gateway::Generic { .. } => "generic",
        }
    }

    pub fn build(&self, delivery: &Delivery<'_>) -> OutboundRequest {
        match self {
            Gateway::ReviewMaster(gateway) => gateway.build(delivery.telephone, delivery.message),
            Gateway::ICabbi => icabbi::build(delivery.tenant, delivery.telephone, delivery.message),
            Gateway::MessageMedia => message_media::build(
                delivery.tenant,
                delivery.event,
                delivery.telephone,
                delivery.message,
            ),
            Gateway::Veezu => veezu::build(delivery.tenant, delivery.telephone, delivery.message),
            Gateway::Generic { .. } => {
                generic::build(delivery.tenant, delivery.event, delivery.message)
            }
        }
    }

    /// True when `response` reports a successful delivery.
    pub fn verify(&self, response: &str) -> bool {
        match self {
            Gateway::ReviewMaster(_) => review_master::verify(response),
            Gateway::ICabbi => icabbi::verify(response),
            Gateway::MessageMedia => message_media::verify(response),
            Gateway::Veezu => veezu::verify(response),
            Gateway::Generic { expected_success } => generic::verify(expected_success, response),
        }
    }
}
