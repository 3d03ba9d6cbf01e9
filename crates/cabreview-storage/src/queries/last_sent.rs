// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Throttle record operations keyed by (telephone, client).

use cabreview_core::CabreviewError;
use cabreview_core::types::{ClientId, LastSentRecord};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::params;

use crate::database::Database;

/// Format a timestamp the way it is stored (RFC 3339, UTC, whole seconds).
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    raw.parse::<NaiveDate>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Fetch the record for a key.
pub async fn fetch_last_sent(
    db: &Database,
    telephone: &str,
    client_id: ClientId,
) -> Result<Option<LastSentRecord>, CabreviewError> {
    let telephone = telephone.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT telephone, client_id, last_sent, last_sent_date, sent_count, stop
                 FROM last_sents WHERE telephone = ?1 AND client_id = ?2",
                params![telephone, client_id as i64],
                |row| {
                    let last_sent: String = row.get(2)?;
                    let last_sent_date: String = row.get(3)?;
                    Ok(LastSentRecord {
                        telephone: row.get(0)?,
                        client_id: row.get::<_, i64>(1)? as ClientId,
                        last_sent: parse_timestamp(2, &last_sent)?,
                        last_sent_date: parse_date(3, &last_sent_date)?,
                        sent_count: row.get(4)?,
                        stop: row.get(5)?,
                    })
                },
            );
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a successful send: `last_sent = now`, the new count, and a cleared stop flag.
pub async fn upsert_last_sent(
    db: &Database,
    telephone: &str,
    client_id: ClientId,
    sent_count: u32,
    now: DateTime<Utc>,
) -> Result<(), CabreviewError> {
    let telephone = telephone.to_string();
    let last_sent = format_timestamp(now);
    let last_sent_date = now.date_naive().to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO last_sents (telephone, client_id, last_sent, last_sent_date, sent_count, stop)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)
                 ON CONFLICT(telephone, client_id) DO UPDATE SET
                    last_sent = excluded.last_sent,
                    last_sent_date = excluded.last_sent_date,
                    sent_count = excluded.sent_count,
                    stop = 0",
                params![telephone, client_id as i64, last_sent, last_sent_date, sent_count],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set the stop flag. Returns whether a record existed.
pub async fn set_stop(
    db: &Database,
    telephone: &str,
    client_id: ClientId,
) -> Result<bool, CabreviewError> {
    let telephone = telephone.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE last_sents SET stop = 1 WHERE telephone = ?1 AND client_id = ?2",
                params![telephone, client_id as i64],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of records for the client whose last send fell on `date`.
pub async fn daily_sent_count(
    db: &Database,
    client_id: ClientId,
    date: NaiveDate,
) -> Result<u32, CabreviewError> {
    let date = date.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(id) FROM last_sents WHERE client_id = ?1 AND last_sent_date = ?2",
                params![client_id as i64, date],
                |row| row.get::<_, u32>(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}
