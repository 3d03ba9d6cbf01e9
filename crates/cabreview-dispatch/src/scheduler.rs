// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send-now-or-defer delivery.
//!
//! Deferred requests are persisted whole for a separate delayed-delivery
//! worker and acknowledged optimistically. Immediate requests go through the
//! [`Sender`] once, with no retry, and are judged by the gateway's verifier.

use std::sync::Arc;

use cabreview_core::types::{
    DispatchStatus, Integration, LastSentRecord, OutboundRequest, SendLaterEntry, TenantConfig,
};
use cabreview_core::{Sender, Store};
use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use crate::gateway::Gateway;
use crate::throttle::next_sent_count;

/// One delivery attempt for an eligible event.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryJob<'a> {
    pub integration: Integration,
    pub tenant: &'a TenantConfig,
    /// Canonical number keying the throttle record and the deferred entry.
    pub telephone: &'a str,
    pub gateway: &'a Gateway,
    pub request: &'a OutboundRequest,
    /// Throttle record read during eligibility, if any.
    pub record: Option<&'a LastSentRecord>,
    pub now: DateTime<Utc>,
}

/// Chooses between deferred and immediate delivery and records the result.
pub struct DeliveryScheduler {
    store: Arc<dyn Store>,
    sender: Arc<dyn Sender>,
}

impl DeliveryScheduler {
    pub fn new(store: Arc<dyn Store>, sender: Arc<dyn Sender>) -> Self {
        Self { store, sender }
    }

    /// Deliver `job`, returning `Sent`, `Deferred`, or `SendFailed`.
    ///
    /// A verified send upserts the throttle record (count + 1, stop cleared).
    /// Store write failures are logged and do not change the status.
    pub async fn deliver(&self, job: DeliveryJob<'_>) -> DispatchStatus {
        let delivery = &job.tenant.delivery;
        if delivery.send_delay_enabled && delivery.send_delay_minutes > 0 {
            return self.defer(&job).await;
        }

        let response = self.sender.send(job.request).await;
        if !job.gateway.verify(&response) {
            error!(
                client_id = job.tenant.client_id,
                gateway = job.gateway.name(),
                url = %job.request.url,
                params = ?job.request.form_params,
                body = ?job.request.json_body,
                response = %response,
                "message delivery failed"
            );
            return DispatchStatus::SendFailed;
        }

        let sent_count = next_sent_count(job.record);
        if let Err(e) = self
            .store
            .upsert_last_sent(job.telephone, job.tenant.client_id, sent_count, job.now)
            .await
        {
            error!(
                client_id = job.tenant.client_id,
                telephone = job.telephone,
                error = %e,
                "failed to record sent message"
            );
        }
        info!(
            client_id = job.tenant.client_id,
            gateway = job.gateway.name(),
            sent_count,
            "review request sent"
        );
        DispatchStatus::Sent
    }

    async fn defer(&self, job: &DeliveryJob<'_>) -> DispatchStatus {
        let entry = send_later_entry(job);
        if let Err(e) = self.store.upsert_send_later(&entry).await {
            error!(
                client_id = job.tenant.client_id,
                telephone = job.telephone,
                error = %e,
                "failed to persist deferred request"
            );
        }
        info!(
            client_id = job.tenant.client_id,
            gateway = job.gateway.name(),
            send_after = %entry.send_after,
            "review request deferred"
        );
        DispatchStatus::Deferred
    }
}

/// Serialize a built request for the delayed-delivery worker.
pub fn send_later_entry(job: &DeliveryJob<'_>) -> SendLaterEntry {
    let delivery = &job.tenant.delivery;
    SendLaterEntry {
        telephone: job.telephone.to_string(),
        client_id: job.tenant.client_id,
        send_after: job.now + Duration::minutes(i64::from(delivery.send_delay_minutes)),
        url: job.request.url.clone(),
        method: job.request.method,
        basic_user: job.request.basic_user.clone(),
        basic_pass: job.request.basic_pass.clone(),
        headers: job.request.headers(),
        params: job.request.form_params.clone(),
        body: job.request.json_body.clone(),
        send_from_icabbi_app: delivery.send_from_icabbi_app,
        review_master_enabled: delivery.review_master_enabled,
        alternate_service_enabled: delivery.alternate_service_enabled,
        alternate_service: delivery.alternate_service.clone(),
        success_response: deferred_success_response(job),
        max_daily_send_count: job.tenant.max_daily_send_count,
    }
}

/// What the delayed-delivery worker reports once the entry is sent.
///
/// Generic tenants keep their configured expectation, `EMPTY` included.
/// CAB 9 always acknowledges with its fixed success envelope.
fn deferred_success_response(job: &DeliveryJob<'_>) -> String {
    match job.integration {
        Integration::Cab9 => job.integration.success_body(job.tenant, ""),
        Integration::Generic | Integration::Cordic => {
            job.tenant.delivery.send_success_response.clone()
        }
    }
}
