// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! All statements run on tokio-rusqlite's single background thread, so writes
//! are serialized. Do NOT create additional Connection instances for writes.

use std::path::Path;

use cabreview_core::CabreviewError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Connection PRAGMAs applied on every open.
const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;";

/// Map a tokio-rusqlite call error into the storage error variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> CabreviewError {
    CabreviewError::storage(e)
}

/// Handle to the SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file, apply PRAGMAs, and run migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CabreviewError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(CabreviewError::storage)?;
        }
        let conn = Connection::open(path).await.map_err(CabreviewError::storage)?;
        let db = Self::prepare(conn).await?;
        debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Open a private in-memory database (tests and dry runs).
    pub async fn open_in_memory() -> Result<Self, CabreviewError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(CabreviewError::storage)?;
        Self::prepare(conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, CabreviewError> {
        conn.call(|conn| conn.execute_batch(PRAGMAS))
            .await
            .map_err(map_tr_err)?;
        conn.call(|conn| migrations::run_migrations(conn).map_err(|e| e.to_string()))
            .await
            .map_err(|e| CabreviewError::storage(e.to_string()))?;
        Ok(Self { conn })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), CabreviewError> {
        self.conn
            .call(|conn| conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
            .await
            .map_err(map_tr_err)
    }
}
