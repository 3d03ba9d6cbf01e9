// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory store for deterministic testing.
//!
//! `MemoryStore` implements `Store` over plain maps and exposes inspection
//! helpers so tests can assert on records, deferred sends, and stats.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;

use cabreview_core::types::{
    ClientId, DailyStats, LastSentRecord, PairedTenant, SendLaterEntry, TenantConfig,
};
use cabreview_core::{CabreviewError, Store};

type Key = (String, ClientId);

/// A `Store` held entirely in process memory.
///
/// Reads can be made to fail with [`MemoryStore::fail_reads`] to exercise
/// degradation paths.
#[derive(Default)]
pub struct MemoryStore {
    tenants: Mutex<HashMap<String, TenantConfig>>,
    last_sents: Mutex<HashMap<Key, LastSentRecord>>,
    send_laters: Mutex<HashMap<Key, SendLaterEntry>>,
    stats: Mutex<HashMap<(ClientId, NaiveDate), DailyStats>>,
    master_queue_id: AtomicU64,
    failing_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enabled tenant under its token.
    pub async fn add_tenant(&self, tenant: TenantConfig) {
        self.tenants
            .lock()
            .await
            .insert(tenant.token.clone(), tenant);
    }

    /// Seed a throttle record.
    pub async fn insert_last_sent(&self, record: LastSentRecord) {
        self.last_sents
            .lock()
            .await
            .insert((record.telephone.clone(), record.client_id), record);
    }

    pub fn set_master_queue_id(&self, id: u64) {
        self.master_queue_id.store(id, Ordering::SeqCst);
    }

    /// Make every read operation return a storage error.
    pub fn fail_reads(&self, fail: bool) {
        self.failing_reads.store(fail, Ordering::SeqCst);
    }

    /// The current throttle record for a key.
    pub async fn last_sent(&self, telephone: &str, client_id: ClientId) -> Option<LastSentRecord> {
        self.last_sents
            .lock()
            .await
            .get(&(telephone.to_string(), client_id))
            .cloned()
    }

    /// All pending deferred sends.
    pub async fn send_laters(&self) -> Vec<SendLaterEntry> {
        self.send_laters.lock().await.values().cloned().collect()
    }

    /// Counters for the client on `date`.
    pub async fn stats(&self, client_id: ClientId, date: NaiveDate) -> DailyStats {
        self.stats
            .lock()
            .await
            .get(&(client_id, date))
            .copied()
            .unwrap_or_default()
    }

    fn check_read(&self) -> Result<(), CabreviewError> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(CabreviewError::storage("simulated read failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_tenant_config(
        &self,
        token: &str,
    ) -> Result<Option<TenantConfig>, CabreviewError> {
        self.check_read()?;
        Ok(self.tenants.lock().await.get(token).cloned())
    }

    async fn fetch_last_sent(
        &self,
        telephone: &str,
        client_id: ClientId,
    ) -> Result<Option<LastSentRecord>, CabreviewError> {
        self.check_read()?;
        Ok(self.last_sent(telephone, client_id).await)
    }

    async fn upsert_last_sent(
        &self,
        telephone: &str,
        client_id: ClientId,
        sent_count: u32,
        now: DateTime<Utc>,
    ) -> Result<(), CabreviewError> {
        let record = LastSentRecord {
            telephone: telephone.to_string(),
            client_id,
            last_sent: now,
            last_sent_date: now.date_naive(),
            sent_count,
            stop: false,
        };
        self.insert_last_sent(record).await;
        Ok(())
    }

    async fn set_stop(&self, telephone: &str, client_id: ClientId) -> Result<(), CabreviewError> {
        if let Some(record) = self
            .last_sents
            .lock()
            .await
            .get_mut(&(telephone.to_string(), client_id))
        {
            record.stop = true;
        }
        Ok(())
    }

    async fn daily_sent_count(
        &self,
        client_id: ClientId,
        date: NaiveDate,
    ) -> Result<u32, CabreviewError> {
        self.check_read()?;
        let count = self
            .last_sents
            .lock()
            .await
            .values()
            .filter(|r| r.client_id == client_id && r.last_sent_date == date)
            .count();
        Ok(count as u32)
    }

    async fn upsert_send_later(&self, entry: &SendLaterEntry) -> Result<(), CabreviewError> {
        self.send_laters
            .lock()
            .await
            .insert((entry.telephone.clone(), entry.client_id), entry.clone());
        Ok(())
    }

    async fn update_stats(
        &self,
        client_id: ClientId,
        token: &str,
        sent: bool,
        date: NaiveDate,
    ) -> Result<(), CabreviewError> {
        let client_id = if client_id == 0 {
            match self.tenants.lock().await.get(token) {
                Some(tenant) => tenant.client_id,
                None => return Ok(()),
            }
        } else {
            client_id
        };
        let mut stats = self.stats.lock().await;
        let entry = stats.entry((client_id, date)).or_default();
        entry.requested_count += 1;
        if sent {
            entry.sent_count += 1;
        }
        Ok(())
    }

    async fn resolve_queue_id_from_pair_code(
        &self,
        code: &str,
    ) -> Result<Option<PairedTenant>, CabreviewError> {
        self.check_read()?;
        if code.is_empty() {
            return Ok(None);
        }
        Ok(self
            .tenants
            .lock()
            .await
            .values()
            .find(|t| t.delivery.review_master_enabled && t.delivery.review_master_pair_code == code)
            .map(|t| PairedTenant {
                client_id: t.client_id,
                use_master_queue: t.delivery.review_master_use_master_queue,
            }))
    }

    async fn master_queue_id(&self) -> Result<u64, CabreviewError> {
        self.check_read()?;
        Ok(self.master_queue_id.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{generic_tenant, utc};

    #[tokio::test]
    async fn upsert_clears_stop_and_counts_per_day() {
        let store = MemoryStore::new();
        let now = utc("2026-03-02T10:00:00Z");
        store.upsert_last_sent("447123456789", 7, 1, now).await.unwrap();
        store.set_stop("447123456789", 7).await.unwrap();
        assert!(store.last_sent("447123456789", 7).await.unwrap().stop);

        store.upsert_last_sent("447123456789", 7, 2, now).await.unwrap();
        let record = store.last_sent("447123456789", 7).await.unwrap();
        assert!(!record.stop);
        assert_eq!(record.sent_count, 2);
        assert_eq!(store.daily_sent_count(7, now.date_naive()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn stats_resolve_unknown_client_from_token() {
        let store = MemoryStore::new();
        store.add_tenant(generic_tenant(7, "tok")).await;
        let day = utc("2026-03-02T10:00:00Z").date_naive();

        store.update_stats(0, "tok", false, day).await.unwrap();
        store.update_stats(0, "nope", false, day).await.unwrap();
        store.update_stats(7, "tok", true, day).await.unwrap();

        let stats = store.stats(7, day).await;
        assert_eq!(stats.requested_count, 2);
        assert_eq!(stats.sent_count, 1);
    }

    #[tokio::test]
    async fn failing_reads_surface_as_storage_errors() {
        let store = MemoryStore::new();
        store.fail_reads(true);
        assert!(store.fetch_tenant_config("tok").await.is_err());
        assert!(store.master_queue_id().await.is_err());
    }
}
