// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dispatch decision engine.
//!
//! [`DispatchEngine`] evaluates one inbound event end to end: tenant lookup,
//! telephone normalization and barring, the eligibility gate, message
//! selection, dispatcher timing, gateway delivery, and the bookkeeping that
//! follows. The result is a [`DispatchOutcome`] carrying the exact response
//! body for the integration the event arrived through.
//!
//! Store read failures never halt evaluation: they are logged and treated as
//! "nothing stored". Store write failures are logged and never change the
//! response.

use std::sync::Arc;

use cabreview_core::types::{
    BOOKED_FOR_TIME_PARAM, BOOKING_CREATION_TIME_PARAM, ClientId, DispatchOutcome, DispatchStatus,
    IGNORE_DISPATCHER_CHECKS, IGNORE_PASSENGER_ID_CHECKS, IGNORE_TELEPHONE_CHECKS,
    IGNORE_TIME_AND_SENT_COUNT_CHECKS, InboundEvent, Integration, LastSentRecord,
    PASSENGER_ID_PARAM, PICKED_UP_TIME_PARAM, RejectReason, TenantConfig,
};
use cabreview_core::{CabreviewError, Sender, Store};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, warn};

use crate::barred::BarredPrefixes;
use crate::gateway::{Delivery, Gateway, ReviewMasterEndpoint};
use crate::message::{resolve_message, select_message};
use crate::queue::MasterQueue;
use crate::scheduler::{DeliveryJob, DeliveryScheduler};
use crate::telephone;
use crate::throttle::{ThrottlePolicy, next_sent_count, within_send_window};
use crate::timing::{TimingThresholds, verify_booking, verify_timing};

/// Result of a successful evaluation: how delivery went and what was sent.
type Evaluation = Result<(DispatchStatus, String), RejectReason>;

/// Orchestrates every check and the delivery for one inbound event.
///
/// Holds no per-event state; one engine serves all concurrent events. The
/// barred prefixes are immutable and the master queue id changes only via
/// [`DispatchEngine::refresh_master_queue`].
pub struct DispatchEngine {
    store: Arc<dyn Store>,
    sender: Arc<dyn Sender>,
    barred: Arc<BarredPrefixes>,
    master_queue: Arc<MasterQueue>,
    review_master: ReviewMasterEndpoint,
    scheduler: DeliveryScheduler,
}

impl DispatchEngine {
    pub fn new(
        store: Arc<dyn Store>,
        sender: Arc<dyn Sender>,
        barred: Arc<BarredPrefixes>,
        master_queue: Arc<MasterQueue>,
        review_master: ReviewMasterEndpoint,
    ) -> Self {
        let scheduler = DeliveryScheduler::new(store.clone(), sender.clone());
        Self {
            store,
            sender,
            barred,
            master_queue,
            review_master,
            scheduler,
        }
    }

    pub fn master_queue(&self) -> &MasterQueue {
        &self.master_queue
    }

    /// Evaluate `event` at the current time.
    pub async fn dispatch(&self, integration: Integration, event: &InboundEvent) -> DispatchOutcome {
        self.dispatch_at(integration, event, Utc::now()).await
    }

    /// Evaluate `event` as of `now`.
    pub async fn dispatch_at(
        &self,
        integration: Integration,
        event: &InboundEvent,
        now: DateTime<Utc>,
    ) -> DispatchOutcome {
        let token = event.token();
        let today = now.date_naive();

        let Some(tenant) = self.fetch_tenant(token).await else {
            debug!(%integration, reason = %RejectReason::UnknownToken, "event not eligible");
            self.record_stats(0, token, false, today).await;
            return DispatchOutcome {
                status: DispatchStatus::NotEligible(RejectReason::UnknownToken),
                body: integration.failure_body(),
            };
        };

        let (status, body) = match self.evaluate(integration, &tenant, event, now).await {
            Ok((status @ (DispatchStatus::Sent | DispatchStatus::Deferred), message)) => {
                (status, integration.success_body(&tenant, &message))
            }
            Ok((status, _)) => (status, integration.failure_body()),
            Err(reason) => {
                debug!(
                    client_id = tenant.client_id,
                    %integration,
                    reason = %reason,
                    "event not eligible"
                );
                (DispatchStatus::NotEligible(reason), integration.failure_body())
            }
        };

        // Deferred events are counted by the delayed-delivery worker, and
        // events for another dispatcher's endpoint never belonged to this one.
        let counted = !matches!(
            status,
            DispatchStatus::Deferred
                | DispatchStatus::NotEligible(RejectReason::WrongDispatcherType)
        );
        if counted {
            let sent = status == DispatchStatus::Sent;
            self.record_stats(tenant.client_id, token, sent, today).await;
        }
        DispatchOutcome { status, body }
    }

    async fn evaluate(
        &self,
        integration: Integration,
        tenant: &TenantConfig,
        event: &InboundEvent,
        now: DateTime<Utc>,
    ) -> Evaluation {
        if let Some(required) = integration.required_dispatcher_type() {
            if !tenant
                .dispatcher
                .dispatcher_type
                .trim()
                .eq_ignore_ascii_case(required)
            {
                return Err(RejectReason::WrongDispatcherType);
            }
        }

        let key = self.throttle_key(integration, tenant, event)?;
        let policy = ThrottlePolicy::from_tenant(tenant);

        if !event.flag(IGNORE_TIME_AND_SENT_COUNT_CHECKS) {
            if !within_send_window(&tenant.schedules, now) {
                return Err(RejectReason::OutsideSendWindow);
            }
            let sent_today = self.daily_sent_count(tenant.client_id, now.date_naive()).await;
            policy.check_daily_cap(sent_today)?;
        }

        let record = self.fetch_last_sent(&key, tenant.client_id).await;
        let record_override = match integration {
            Integration::Cordic => IGNORE_PASSENGER_ID_CHECKS,
            Integration::Generic | Integration::Cab9 => IGNORE_TELEPHONE_CHECKS,
        };
        if !event.flag(record_override) {
            policy.check_record(record.as_ref(), now)?;
        }

        let candidate = resolve_message(&tenant.message, event.field(&tenant.message_parameter));
        let message = select_message(
            &candidate,
            tenant.message.multi_message_enabled,
            &tenant.message.multi_message_separator,
            &mut rand::thread_rng(),
        );
        if message.is_empty() {
            return Err(RejectReason::EmptyMessage);
        }

        if !event.flag(IGNORE_DISPATCHER_CHECKS) {
            self.check_timing(integration, tenant, event).await?;
        }

        if integration == Integration::Cordic {
            // Nothing is delivered; the caller sends the returned message itself.
            self.record_sent(&key, tenant.client_id, record.as_ref(), now).await;
            return Ok((DispatchStatus::Sent, message));
        }
        if integration == Integration::Cab9 && !tenant.delivery.review_master_enabled {
            return Err(RejectReason::NoDeliveryBackend);
        }

        let gateway = Gateway::select(tenant, &message, &self.review_master, self.master_queue.get());
        let outgoing = if tenant.delivery.replace_telephone_country_code {
            telephone::replace_country_code(
                &key,
                &tenant.country,
                &tenant.delivery.replace_telephone_country_code_with,
            )
        } else {
            key.clone()
        };
        let request = gateway.build(&Delivery {
            tenant,
            event,
            telephone: &outgoing,
            message: &message,
        });

        let status = self
            .scheduler
            .deliver(DeliveryJob {
                integration,
                tenant,
                telephone: &key,
                gateway: &gateway,
                request: &request,
                record: record.as_ref(),
                now,
            })
            .await;
        Ok((status, message))
    }

    /// The throttle key: canonical telephone, or the passenger id.
    fn throttle_key(
        &self,
        integration: Integration,
        tenant: &TenantConfig,
        event: &InboundEvent,
    ) -> Result<String, RejectReason> {
        if integration == Integration::Cordic {
            let passenger_id = event.field(PASSENGER_ID_PARAM);
            if passenger_id.is_empty() {
                return Err(RejectReason::MissingPassengerId);
            }
            return Ok(passenger_id.to_string());
        }

        let raw = event.field(&tenant.telephone_parameter);
        let canonical = telephone::normalize(raw, &tenant.country);
        if canonical.is_empty() {
            debug!(client_id = tenant.client_id, telephone = raw, "telephone did not normalize");
            return Err(RejectReason::InvalidTelephone);
        }
        if self.barred.is_barred(&canonical) {
            return Err(RejectReason::Barred);
        }
        Ok(canonical)
    }

    async fn check_timing(
        &self,
        integration: Integration,
        tenant: &TenantConfig,
        event: &InboundEvent,
    ) -> Result<(), RejectReason> {
        match integration {
            Integration::Generic => {
                let dispatcher = &tenant.dispatcher;
                let configured = dispatcher.checks_enabled
                    && !dispatcher.url.trim().is_empty()
                    && !tenant.app_key.is_empty()
                    && !tenant.secret_key.is_empty()
                    && !dispatcher.booking_id_parameter.is_empty();
                if !configured {
                    return Ok(());
                }
                let trip_id = event.field(&dispatcher.booking_id_parameter);
                let passed = verify_booking(
                    self.sender.as_ref(),
                    dispatcher,
                    &tenant.app_key,
                    &tenant.secret_key,
                    trip_id,
                )
                .await;
                if passed {
                    Ok(())
                } else {
                    Err(RejectReason::DispatcherTimingFailed)
                }
            }
            Integration::Cab9 | Integration::Cordic => {
                let created = event.field(BOOKING_CREATION_TIME_PARAM);
                let booked_for = event.field(BOOKED_FOR_TIME_PARAM);
                let picked_up = event.field(PICKED_UP_TIME_PARAM);
                if created.is_empty() || booked_for.is_empty() || picked_up.is_empty() {
                    return Err(RejectReason::MissingTimingField);
                }
                let thresholds = TimingThresholds::from(&tenant.dispatcher);
                if verify_timing(created, booked_for, picked_up, thresholds) {
                    Ok(())
                } else {
                    Err(RejectReason::DispatcherTimingFailed)
                }
            }
        }
    }

    /// Set the stop flag for a number (or passenger id) under a client.
    pub async fn set_stop(&self, telephone: &str, client_id: ClientId) -> Result<(), CabreviewError> {
        self.store.set_stop(telephone, client_id).await?;
        debug!(client_id, telephone, "stop flag set");
        Ok(())
    }

    /// Review-Master queue for a pairing code: the master queue when the
    /// paired tenant uses it, else the tenant's client id, 0 when unknown.
    pub async fn resolve_queue_id(&self, pair_code: &str) -> u64 {
        match self.store.resolve_queue_id_from_pair_code(pair_code.trim()).await {
            Ok(Some(paired)) if paired.use_master_queue => self.master_queue.get(),
            Ok(Some(paired)) => paired.client_id,
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "pair code lookup failed");
                0
            }
        }
    }

    /// Reload the master queue id from the store.
    pub async fn refresh_master_queue(&self) -> Result<u64, CabreviewError> {
        self.master_queue.refresh(self.store.as_ref()).await
    }

    async fn fetch_tenant(&self, token: &str) -> Option<TenantConfig> {
        if token.is_empty() {
            return None;
        }
        match self.store.fetch_tenant_config(token).await {
            Ok(tenant) => tenant.filter(|t| t.client_id != 0),
            Err(e) => {
                warn!(error = %e, "tenant lookup failed");
                None
            }
        }
    }

    async fn fetch_last_sent(&self, key: &str, client_id: ClientId) -> Option<LastSentRecord> {
        self.store
            .fetch_last_sent(key, client_id)
            .await
            .unwrap_or_else(|e| {
                warn!(client_id, error = %e, "throttle record lookup failed");
                None
            })
    }

    async fn daily_sent_count(&self, client_id: ClientId, date: NaiveDate) -> u32 {
        self.store
            .daily_sent_count(client_id, date)
            .await
            .unwrap_or_else(|e| {
                warn!(client_id, error = %e, "daily count lookup failed");
                0
            })
    }

    async fn record_sent(
        &self,
        key: &str,
        client_id: ClientId,
        record: Option<&LastSentRecord>,
        now: DateTime<Utc>,
    ) {
        if let Err(e) = self
            .store
            .upsert_last_sent(key, client_id, next_sent_count(record), now)
            .await
        {
            error!(client_id, error = %e, "failed to record sent message");
        }
    }

    async fn record_stats(&self, client_id: ClientId, token: &str, sent: bool, date: NaiveDate) {
        if let Err(e) = self.store.update_stats(client_id, token, sent, date).await {
            error!(client_id, error = %e, "failed to update stats");
        }
    }
}
