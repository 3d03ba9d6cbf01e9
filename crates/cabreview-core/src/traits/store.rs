// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable state collaborator.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::CabreviewError;
use crate::types::{ClientId, LastSentRecord, PairedTenant, SendLaterEntry, TenantConfig};

/// Tenant configuration, throttle records, deferred sends, and stats.
///
/// Reads and writes are independent: there is no transaction spanning an
/// eligibility read and the following record write.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetches the enabled tenant owning `token`, or `None` when the token is
    /// unknown or the tenant or its client is disabled.
    async fn fetch_tenant_config(&self, token: &str)
    -> Result<Option<TenantConfig>, CabreviewError>;

    /// Fetches the throttle record for a (telephone, client) key.
    async fn fetch_last_sent(
        &self,
        telephone: &str,
        client_id: ClientId,
    ) -> Result<Option<LastSentRecord>, CabreviewError>;

    /// Inserts or updates the record with `last_sent = now`, the given count,
    /// and `stop = false`.
    async fn upsert_last_sent(
        &self,
        telephone: &str,
        client_id: ClientId,
        sent_count: u32,
        now: DateTime<Utc>,
    ) -> Result<(), CabreviewError>;

    /// Sets the stop flag on an existing record. Missing records are left alone.
    async fn set_stop(&self, telephone: &str, client_id: ClientId) -> Result<(), CabreviewError>;

    /// Number of records for the client whose last send fell on `date`.
    async fn daily_sent_count(
        &self,
        client_id: ClientId,
        date: NaiveDate,
    ) -> Result<u32, CabreviewError>;

    /// Inserts or replaces the deferred request for the entry's key.
    async fn upsert_send_later(&self, entry: &SendLaterEntry) -> Result<(), CabreviewError>;

    /// Counts one request (and one send when `sent`) for the client on `date`.
    ///
    /// A zero `client_id` is resolved from `token`; an unresolvable token
    /// records nothing.
    async fn update_stats(
        &self,
        client_id: ClientId,
        token: &str,
        sent: bool,
        date: NaiveDate,
    ) -> Result<(), CabreviewError>;

    /// Finds the enabled Review-Master tenant paired with `code`.
    async fn resolve_queue_id_from_pair_code(
        &self,
        code: &str,
    ) -> Result<Option<PairedTenant>, CabreviewError>;

    /// Highest master queue id, or 0 when none exist.
    async fn master_queue_id(&self) -> Result<u64, CabreviewError>;
}
