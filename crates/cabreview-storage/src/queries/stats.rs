// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily request/send counters.

use cabreview_core::CabreviewError;
use cabreview_core::types::{ClientId, DailyStats};
use chrono::NaiveDate;
use rusqlite::params;

use crate::database::Database;

/// Count one request for the client on `date`, plus one send when `sent`.
pub async fn record_request(
    db: &Database,
    client_id: ClientId,
    date: NaiveDate,
    sent: bool,
) -> Result<(), CabreviewError> {
    let date = date.to_string();
    let sent = u32::from(sent);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO stats (client_id, stats_date, requested_count, sent_count)
                 VALUES (?1, ?2, 1, ?3)
                 ON CONFLICT(client_id, stats_date) DO UPDATE SET
                    requested_count = requested_count + 1,
                    sent_count = sent_count + excluded.sent_count",
                params![client_id as i64, date, sent],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Counters for the client on `date` (zero when nothing was recorded).
pub async fn fetch_stats(
    db: &Database,
    client_id: ClientId,
    date: NaiveDate,
) -> Result<DailyStats, CabreviewError> {
    let date = date.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT requested_count, sent_count FROM stats
                 WHERE client_id = ?1 AND stats_date = ?2",
                params![client_id as i64, date],
                |row| {
                    Ok(DailyStats {
                        requested_count: row.get(0)?,
                        sent_count: row.get(1)?,
                    })
                },
            );
            match result {
                Ok(stats) => Ok(stats),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(DailyStats::default()),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
