// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client and tenant configuration queries.

use cabreview_core::CabreviewError;
use cabreview_core::types::{
    ClientId, DeliverySettings, DispatcherSettings, MessageSettings, PairedTenant, Schedule,
    TenantConfig,
};
use rusqlite::{Row, named_params};

use crate::database::Database;

/// Columns read by [`tenant_from_row`], in order.
const TENANT_COLUMNS: &str = "client.id, config.token, client.country,
    config.min_send_frequency_days, config.max_send_count, config.max_daily_send_count,
    config.telephone_parameter, config.message_parameter, config.app_key, config.secret_key,
    config.use_database_message, config.message,
    config.multi_message_enabled, config.multi_message_separator,
    config.send_url, config.http_get, config.send_success_response,
    config.send_from_icabbi_app, config.review_master_enabled,
    config.review_master_use_master_queue, config.review_master_pair_code,
    config.alternate_service_enabled, config.alternate_service, config.alternate_service_secret1,
    config.replace_telephone_country_code, config.replace_telephone_country_code_with,
    config.send_delay_enabled, config.send_delay_minutes,
    config.dispatcher_checks_enabled, config.dispatcher_url, config.dispatcher_type,
    config.booking_id_parameter, config.is_booking_for_now_diff_minutes,
    config.now_pickup_to_contact_minutes, config.pre_booking_pickup_to_contact_minutes";

fn tenant_from_row(row: &Row<'_>) -> rusqlite::Result<TenantConfig> {
    Ok(TenantConfig {
        client_id: row.get::<_, i64>(0)? as ClientId,
        token: row.get(1)?,
        country: row.get(2)?,
        min_send_frequency_days: row.get(3)?,
        max_send_count: row.get(4)?,
        max_daily_send_count: row.get(5)?,
        telephone_parameter: row.get(6)?,
        message_parameter: row.get(7)?,
        app_key: row.get(8)?,
        secret_key: row.get(9)?,
        schedules: Vec::new(),
        message: MessageSettings {
            use_database_message: row.get(10)?,
            message: row.get(11)?,
            multi_message_enabled: row.get(12)?,
            multi_message_separator: row.get(13)?,
        },
        delivery: DeliverySettings {
            send_url: row.get(14)?,
            http_get: row.get(15)?,
            send_success_response: row.get(16)?,
            send_from_icabbi_app: row.get(17)?,
            review_master_enabled: row.get(18)?,
            review_master_use_master_queue: row.get(19)?,
            review_master_pair_code: row.get(20)?,
            alternate_service_enabled: row.get(21)?,
            alternate_service: row.get(22)?,
            alternate_service_secret1: row.get(23)?,
            replace_telephone_country_code: row.get(24)?,
            replace_telephone_country_code_with: row.get(25)?,
            send_delay_enabled: row.get(26)?,
            send_delay_minutes: row.get(27)?,
        },
        dispatcher: DispatcherSettings {
            checks_enabled: row.get(28)?,
            url: row.get(29)?,
            dispatcher_type: row.get(30)?,
            booking_id_parameter: row.get(31)?,
            is_booking_for_now_diff_minutes: row.get(32)?,
            now_pickup_to_contact_minutes: row.get(33)?,
            pre_booking_pickup_to_contact_minutes: row.get(34)?,
        },
    })
}

const SCHEDULE_COLUMNS: &str = "enabled, start_time, end_time, time_zone,
    monday, tuesday, wednesday, thursday, friday, saturday, sunday";

fn schedule_from_row(row: &Row<'_>) -> rusqlite::Result<Schedule> {
    Ok(Schedule {
        enabled: row.get(0)?,
        start: row.get(1)?,
        end: row.get(2)?,
        time_zone: row.get(3)?,
        monday: row.get(4)?,
        tuesday: row.get(5)?,
        wednesday: row.get(6)?,
        thursday: row.get(7)?,
        friday: row.get(8)?,
        saturday: row.get(9)?,
        sunday: row.get(10)?,
    })
}

/// Insert or update a client company.
pub async fn upsert_client(
    db: &Database,
    client_id: ClientId,
    name: &str,
    country: &str,
    enabled: bool,
) -> Result<(), CabreviewError> {
    let name = name.to_string();
    let country = country.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO clients (id, name, country, enabled) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET name = ?2, country = ?3, enabled = ?4",
                rusqlite::params![client_id as i64, name, country, enabled],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch the enabled tenant owning `token`, joined with its enabled client.
pub async fn fetch_tenant_config(
    db: &Database,
    token: &str,
) -> Result<Option<TenantConfig>, CabreviewError> {
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {TENANT_COLUMNS}
                 FROM tenant_configs AS config
                 JOIN clients AS client ON client.id = config.client_id
                 WHERE config.token = ?1 AND config.enabled = 1 AND client.enabled = 1
                 LIMIT 1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut tenant = match stmt.query_row([&token], tenant_from_row) {
                Ok(tenant) => tenant,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e),
            };

            let sql = format!(
                "SELECT {SCHEDULE_COLUMNS}
                 FROM tenant_config_times
                 WHERE tenant_config_id = (SELECT id FROM tenant_configs WHERE token = ?1)
                 ORDER BY id"
            );
            let mut stmt = conn.prepare(&sql)?;
            tenant.schedules = stmt
                .query_map([&token], schedule_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(Some(tenant))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or replace the configuration for `tenant.token`.
///
/// The tenant's `country` is stored on its client row, which must exist. Its
/// send windows replace any previously stored for the token.
pub async fn upsert_tenant_config(
    db: &Database,
    tenant: &TenantConfig,
    enabled: bool,
) -> Result<(), CabreviewError> {
    let t = tenant.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE clients SET country = ?1 WHERE id = ?2",
                rusqlite::params![t.country, t.client_id as i64],
            )?;
            tx.execute(
                "INSERT INTO tenant_configs (
                    client_id, token, enabled,
                    min_send_frequency_days, max_send_count, max_daily_send_count,
                    telephone_parameter, message_parameter, app_key, secret_key,
                    use_database_message, message, multi_message_enabled, multi_message_separator,
                    send_url, http_get, send_success_response, send_from_icabbi_app,
                    review_master_enabled, review_master_use_master_queue, review_master_pair_code,
                    alternate_service_enabled, alternate_service, alternate_service_secret1,
                    replace_telephone_country_code, replace_telephone_country_code_with,
                    send_delay_enabled, send_delay_minutes,
                    dispatcher_checks_enabled, dispatcher_url, dispatcher_type, booking_id_parameter,
                    is_booking_for_now_diff_minutes, now_pickup_to_contact_minutes,
                    pre_booking_pickup_to_contact_minutes
                 ) VALUES (
                    :client_id, :token, :enabled,
                    :min_freq, :max_count, :max_daily,
                    :tel_param, :msg_param, :app_key, :secret_key,
                    :use_db_msg, :message, :multi, :separator,
                    :send_url, :http_get, :success, :icabbi,
                    :rm, :rm_master, :rm_pair,
                    :alt, :alt_service, :alt_secret,
                    :replace_cc, :replace_cc_with,
                    :delay, :delay_minutes,
                    :checks, :dispatcher_url, :dispatcher_type, :booking_param,
                    :now_diff, :now_contact, :pre_contact
                 )
                 ON CONFLICT(token) DO UPDATE SET
                    client_id = excluded.client_id, enabled = excluded.enabled,
                    min_send_frequency_days = excluded.min_send_frequency_days,
                    max_send_count = excluded.max_send_count,
                    max_daily_send_count = excluded.max_daily_send_count,
                    telephone_parameter = excluded.telephone_parameter,
                    message_parameter = excluded.message_parameter,
                    app_key = excluded.app_key, secret_key = excluded.secret_key,
                    use_database_message = excluded.use_database_message,
                    message = excluded.message,
                    multi_message_enabled = excluded.multi_message_enabled,
                    multi_message_separator = excluded.multi_message_separator,
                    send_url = excluded.send_url, http_get = excluded.http_get,
                    send_success_response = excluded.send_success_response,
                    send_from_icabbi_app = excluded.send_from_icabbi_app,
                    review_master_enabled = excluded.review_master_enabled,
                    review_master_use_master_queue = excluded.review_master_use_master_queue,
                    review_master_pair_code = excluded.review_master_pair_code,
                    alternate_service_enabled = excluded.alternate_service_enabled,
                    alternate_service = excluded.alternate_service,
                    alternate_service_secret1 = excluded.alternate_service_secret1,
                    replace_telephone_country_code = excluded.replace_telephone_country_code,
                    replace_telephone_country_code_with = excluded.replace_telephone_country_code_with,
                    send_delay_enabled = excluded.send_delay_enabled,
                    send_delay_minutes = excluded.send_delay_minutes,
                    dispatcher_checks_enabled = excluded.dispatcher_checks_enabled,
                    dispatcher_url = excluded.dispatcher_url,
                    dispatcher_type = excluded.dispatcher_type,
                    booking_id_parameter = excluded.booking_id_parameter,
                    is_booking_for_now_diff_minutes = excluded.is_booking_for_now_diff_minutes,
                    now_pickup_to_contact_minutes = excluded.now_pickup_to_contact_minutes,
                    pre_booking_pickup_to_contact_minutes = excluded.pre_booking_pickup_to_contact_minutes",
                named_params! {
                    ":client_id": t.client_id as i64,
                    ":token": t.token,
                    ":enabled": enabled,
                    ":min_freq": t.min_send_frequency_days,
                    ":max_count": t.max_send_count,
                    ":max_daily": t.max_daily_send_count,
                    ":tel_param": t.telephone_parameter,
                    ":msg_param": t.message_parameter,
                    ":app_key": t.app_key,
                    ":secret_key": t.secret_key,
                    ":use_db_msg": t.message.use_database_message,
                    ":message": t.message.message,
                    ":multi": t.message.multi_message_enabled,
                    ":separator": t.message.multi_message_separator,
                    ":send_url": t.delivery.send_url,
                    ":http_get": t.delivery.http_get,
                    ":success": t.delivery.send_success_response,
                    ":icabbi": t.delivery.send_from_icabbi_app,
                    ":rm": t.delivery.review_master_enabled,
                    ":rm_master": t.delivery.review_master_use_master_queue,
                    ":rm_pair": t.delivery.review_master_pair_code,
                    ":alt": t.delivery.alternate_service_enabled,
                    ":alt_service": t.delivery.alternate_service,
                    ":alt_secret": t.delivery.alternate_service_secret1,
                    ":replace_cc": t.delivery.replace_telephone_country_code,
                    ":replace_cc_with": t.delivery.replace_telephone_country_code_with,
                    ":delay": t.delivery.send_delay_enabled,
                    ":delay_minutes": t.delivery.send_delay_minutes,
                    ":checks": t.dispatcher.checks_enabled,
                    ":dispatcher_url": t.dispatcher.url,
                    ":dispatcher_type": t.dispatcher.dispatcher_type,
                    ":booking_param": t.dispatcher.booking_id_parameter,
                    ":now_diff": t.dispatcher.is_booking_for_now_diff_minutes,
                    ":now_contact": t.dispatcher.now_pickup_to_contact_minutes,
                    ":pre_contact": t.dispatcher.pre_booking_pickup_to_contact_minutes,
                },
            )?;
            let config_id: i64 = tx.query_row(
                "SELECT id FROM tenant_configs WHERE token = ?1",
                [&t.token],
                |row| row.get(0),
            )?;
            tx.execute(
                "DELETE FROM tenant_config_times WHERE tenant_config_id = ?1",
                [config_id],
            )?;
            for schedule in &t.schedules {
                tx.execute(
                    "INSERT INTO tenant_config_times (
                        tenant_config_id, enabled, start_time, end_time, time_zone,
                        monday, tuesday, wednesday, thursday, friday, saturday, sunday
                     ) VALUES (
                        :config_id, :enabled, :start, :end, :tz,
                        :mon, :tue, :wed, :thu, :fri, :sat, :sun
                     )",
                    named_params! {
                        ":config_id": config_id,
                        ":enabled": schedule.enabled,
                        ":start": schedule.start,
                        ":end": schedule.end,
                        ":tz": schedule.time_zone,
                        ":mon": schedule.monday,
                        ":tue": schedule.tuesday,
                        ":wed": schedule.wednesday,
                        ":thu": schedule.thursday,
                        ":fri": schedule.friday,
                        ":sat": schedule.saturday,
                        ":sun": schedule.sunday,
                    },
                )?;
            }
            tx.commit()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Client id of the enabled tenant owning `token`.
pub async fn client_id_for_token(
    db: &Database,
    token: &str,
) -> Result<Option<ClientId>, CabreviewError> {
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT client.id
                 FROM tenant_configs AS config
                 JOIN clients AS client ON client.id = config.client_id
                 WHERE config.token = ?1 AND config.enabled = 1 AND client.enabled = 1
                 LIMIT 1",
                [&token],
                |row| row.get::<_, i64>(0),
            );
            match result {
                Ok(id) => Ok(Some(id as ClientId)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find the enabled Review-Master tenant paired with `code`.
pub async fn find_pair_code(
    db: &Database,
    code: &str,
) -> Result<Option<PairedTenant>, CabreviewError> {
    let code = code.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT client.id, config.review_master_use_master_queue
                 FROM tenant_configs AS config
                 JOIN clients AS client ON client.id = config.client_id
                 WHERE config.review_master_pair_code = ?1
                   AND config.review_master_enabled = 1
                   AND config.enabled = 1
                   AND client.enabled = 1
                 LIMIT 1",
                [&code],
                |row| {
                    Ok(PairedTenant {
                        client_id: row.get::<_, i64>(0)? as ClientId,
                        use_master_queue: row.get(1)?,
                    })
                },
            );
            match result {
                Ok(paired) => Ok(Some(paired)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
