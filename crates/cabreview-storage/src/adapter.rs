// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`Store`] trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use cabreview_config::model::StorageConfig;
use cabreview_core::types::{ClientId, LastSentRecord, PairedTenant, SendLaterEntry, TenantConfig};
use cabreview_core::{CabreviewError, Store};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is opened on the first call to [`SqliteStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a store for the configured path. Nothing is opened yet.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already opened database.
    pub fn from_database(db: Database) -> Self {
        Self {
            config: StorageConfig {
                database_path: String::new(),
            },
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Open the database and run migrations.
    pub async fn initialize(&self) -> Result<(), CabreviewError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| CabreviewError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), CabreviewError> {
        self.database()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// The underlying database, or an error if not initialized.
    pub fn database(&self) -> Result<&Database, CabreviewError> {
        self.db.get().ok_or_else(|| CabreviewError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn fetch_tenant_config(
        &self,
        token: &str,
    ) -> Result<Option<TenantConfig>, CabreviewError> {
        if token.is_empty() {
            return Ok(None);
        }
        queries::tenants::fetch_tenant_config(self.database()?, token).await
    }

    async fn fetch_last_sent(
        &self,
        telephone: &str,
        client_id: ClientId,
    ) -> Result<Option<LastSentRecord>, CabreviewError> {
        queries::last_sent::fetch_last_sent(self.database()?, telephone, client_id).await
    }

    async fn upsert_last_sent(
        &self,
        telephone: &str,
        client_id: ClientId,
        sent_count: u32,
        now: DateTime<Utc>,
    ) -> Result<(), CabreviewError> {
        queries::last_sent::upsert_last_sent(self.database()?, telephone, client_id, sent_count, now)
            .await
    }

    async fn set_stop(&self, telephone: &str, client_id: ClientId) -> Result<(), CabreviewError> {
        let found = queries::last_sent::set_stop(self.database()?, telephone, client_id).await?;
        if !found {
            debug!(telephone, client_id, "stop requested for unknown record");
        }
        Ok(())
    }

    async fn daily_sent_count(
        &self,
        client_id: ClientId,
        date: NaiveDate,
    ) -> Result<u32, CabreviewError> {
        queries::last_sent::daily_sent_count(self.database()?, client_id, date).await
    }

    async fn upsert_send_later(&self, entry: &SendLaterEntry) -> Result<(), CabreviewError> {
        queries::send_later::upsert_send_later(self.database()?, entry).await
    }

    async fn update_stats(
        &self,
        client_id: ClientId,
        token: &str,
        sent: bool,
        date: NaiveDate,
    ) -> Result<(), CabreviewError> {
        let db = self.database()?;
        let client_id = if client_id == 0 && !token.is_empty() {
            queries::tenants::client_id_for_token(db, token)
                .await?
                .unwrap_or(0)
        } else {
            client_id
        };
        if client_id == 0 {
            debug!(token, "stats skipped: client not resolvable");
            return Ok(());
        }
        queries::stats::record_request(db, client_id, date, sent).await
    }

    async fn resolve_queue_id_from_pair_code(
        &self,
        code: &str,
    ) -> Result<Option<PairedTenant>, CabreviewError> {
        if code.is_empty() {
            return Ok(None);
        }
        queries::tenants::find_pair_code(self.database()?, code).await
    }

    async fn master_queue_id(&self) -> Result<u64, CabreviewError> {
        queries::master_queue::master_queue_id(self.database()?).await
    }
}
