// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review-Master master queue lookups.

use cabreview_core::CabreviewError;

use crate::database::Database;

/// Highest master queue id, or 0 when the table is empty.
pub async fn master_queue_id(db: &Database) -> Result<u64, CabreviewError> {
    db.connection()
        .call(|conn| {
            conn.query_row("SELECT COALESCE(MAX(id), 0) FROM master_queues", [], |row| {
                row.get::<_, i64>(0)
            })
        })
        .await
        .map(|id| id as u64)
        .map_err(crate::database::map_tr_err)
}

/// Create a new master queue and return its id.
pub async fn create_master_queue(db: &Database) -> Result<u64, CabreviewError> {
    db.connection()
        .call(|conn| {
            conn.execute("INSERT INTO master_queues DEFAULT VALUES", [])?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map(|id| id as u64)
        .map_err(crate::database::map_tr_err)
}
