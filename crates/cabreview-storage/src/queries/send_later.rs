// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deferred request persistence.
//!
//! Headers are stored as a JSON object and parameters as a URL-encoded query
//! string, so the delayed-delivery worker can replay the request verbatim.

use std::collections::BTreeMap;

use cabreview_core::CabreviewError;
use cabreview_core::types::{ClientId, HttpMethod, SendLaterEntry};
use rusqlite::named_params;

use crate::database::Database;
use crate::queries::last_sent::{format_timestamp, parse_timestamp};

/// Insert or replace the pending request for the entry's (telephone, client) key.
pub async fn upsert_send_later(db: &Database, entry: &SendLaterEntry) -> Result<(), CabreviewError> {
    let headers = serde_json::to_string(&entry.headers).map_err(CabreviewError::storage)?;
    let params = serde_urlencoded::to_string(&entry.params).map_err(CabreviewError::storage)?;
    let e = entry.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO send_laters (
                    telephone, client_id, send_after, send_url, http_method, app_key, secret_key,
                    http_headers, http_params, http_body, send_from_icabbi_app,
                    review_master_enabled, alternate_service_enabled, alternate_service,
                    send_success_response, max_daily_send_count
                 ) VALUES (
                    :telephone, :client_id, :send_after, :url, :method, :user, :pass,
                    :headers, :params, :body, :icabbi, :rm, :alt, :alt_service, :success, :max_daily
                 )
                 ON CONFLICT(telephone, client_id) DO UPDATE SET
                    send_after = excluded.send_after,
                    send_url = excluded.send_url,
                    http_method = excluded.http_method,
                    app_key = excluded.app_key,
                    secret_key = excluded.secret_key,
                    http_headers = excluded.http_headers,
                    http_params = excluded.http_params,
                    http_body = excluded.http_body,
                    send_from_icabbi_app = excluded.send_from_icabbi_app,
                    review_master_enabled = excluded.review_master_enabled,
                    alternate_service_enabled = excluded.alternate_service_enabled,
                    alternate_service = excluded.alternate_service,
                    send_success_response = excluded.send_success_response,
                    max_daily_send_count = excluded.max_daily_send_count",
                named_params! {
                    ":telephone": e.telephone,
                    ":client_id": e.client_id as i64,
                    ":send_after": format_timestamp(e.send_after),
                    ":url": e.url,
                    ":method": e.method.to_string(),
                    ":user": e.basic_user,
                    ":pass": e.basic_pass,
                    ":headers": headers,
                    ":params": params,
                    ":body": e.body,
                    ":icabbi": e.send_from_icabbi_app,
                    ":rm": e.review_master_enabled,
                    ":alt": e.alternate_service_enabled,
                    ":alt_service": e.alternate_service,
                    ":success": e.success_response,
                    ":max_daily": e.max_daily_send_count,
                },
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch the pending request for a key.
pub async fn fetch_send_later(
    db: &Database,
    telephone: &str,
    client_id: ClientId,
) -> Result<Option<SendLaterEntry>, CabreviewError> {
    let telephone = telephone.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT telephone, client_id, send_after, send_url, http_method, app_key, secret_key,
                        http_headers, http_params, http_body, send_from_icabbi_app,
                        review_master_enabled, alternate_service_enabled, alternate_service,
                        send_success_response, max_daily_send_count
                 FROM send_laters WHERE telephone = ?1 AND client_id = ?2",
                rusqlite::params![telephone, client_id as i64],
                |row| {
                    let send_after: String = row.get(2)?;
                    let method: String = row.get(4)?;
                    let headers: String = row.get(7)?;
                    let params: String = row.get(8)?;
                    Ok(SendLaterEntry {
                        telephone: row.get(0)?,
                        client_id: row.get::<_, i64>(1)? as ClientId,
                        send_after: parse_timestamp(2, &send_after)?,
                        url: row.get(3)?,
                        method: method.parse::<HttpMethod>().map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                4,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?,
                        basic_user: row.get(5)?,
                        basic_pass: row.get(6)?,
                        headers: serde_json::from_str::<BTreeMap<String, String>>(&headers)
                            .map_err(|e| {
                                rusqlite::Error::FromSqlConversionFailure(
                                    7,
                                    rusqlite::types::Type::Text,
                                    Box::new(e),
                                )
                            })?,
                        params: serde_urlencoded::from_str::<BTreeMap<String, String>>(&params)
                            .map_err(|e| {
                                rusqlite::Error::FromSqlConversionFailure(
                                    8,
                                    rusqlite::types::Type::Text,
                                    Box::new(e),
                                )
                            })?,
                        body: row.get(9)?,
                        send_from_icabbi_app: row.get(10)?,
                        review_master_enabled: row.get(11)?,
                        alternate_service_enabled: row.get(12)?,
                        alternate_service: row.get(13)?,
                        success_response: row.get(14)?,
                        max_daily_send_count: row.get(15)?,
                    })
                },
            );
            match result {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
