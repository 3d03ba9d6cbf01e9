// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Out-of-band operations: opt-out, Review-Master pairing, and master queue refresh.

use cabreview_config::CabreviewConfig;
use cabreview_core::CabreviewError;
use cabreview_core::types::ClientId;

use crate::runtime;

/// Throttle key for `cabreview stop`.
///
/// With a country the number is normalized the same way dispatch keys it, and
/// a number that does not normalize is refused. Without one it is taken as
/// already canonical.
fn stop_key(telephone: &str, country: Option<&str>) -> Result<String, CabreviewError> {
    let Some(country) = country else {
        return Ok(telephone.trim().to_string());
    };
    let canonical = cabreview_dispatch::telephone::normalize(telephone, country);
    if canonical.is_empty() {
        return Err(CabreviewError::InvalidEvent(format!(
            "{} is not a {country} mobile number",
            telephone.trim()
        )));
    }
    Ok(canonical)
}

/// Run `cabreview stop`.
pub async fn run_stop(
    config: &CabreviewConfig,
    telephone: &str,
    client_id: ClientId,
    country: Option<&str>,
) -> Result<(), CabreviewError> {
    let key = stop_key(telephone, country)?;
    let store = runtime::open_store(config).await?;
    let engine = runtime::build_engine(config, store.clone()).await?;
    engine.set_stop(&key, client_id).await?;
    store.close().await?;
    println!("stopped {key} for client {client_id}");
    Ok(())
}

/// Run `cabreview pair`. Prints 0 for an unknown code.
pub async fn run_pair(config: &CabreviewConfig, code: &str) -> Result<(), CabreviewError> {
    let store = runtime::open_store(config).await?;
    let engine = runtime::build_engine(config, store.clone()).await?;
    let queue_id = engine.resolve_queue_id(code).await;
    store.close().await?;
    println!("{queue_id}");
    Ok(())
}

/// Run `cabreview refresh-master-queue`.
pub async fn run_refresh_master_queue(config: &CabreviewConfig) -> Result<(), CabreviewError> {
    let store = runtime::open_store(config).await?;
    let engine = runtime::build_engine(config, store.clone()).await?;
    let id = engine.refresh_master_queue().await?;
    store.close().await?;
    println!("{id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_key_normalizes_when_a_country_is_given() {
        assert_eq!(stop_key("07123456789", Some("GB")).unwrap(), "447123456789");
        assert_eq!(stop_key("+44 7123 456789", Some("GB")).unwrap(), "447123456789");
        assert_eq!(stop_key("3471234567", Some("IT")).unwrap(), "393471234567");
    }

    #[test]
    fn stop_key_without_country_is_taken_verbatim() {
        assert_eq!(stop_key(" 447123456789 ", None).unwrap(), "447123456789");
    }

    #[test]
    fn stop_key_refuses_numbers_that_do_not_normalize() {
        assert!(matches!(
            stop_key("01132345678", Some("GB")),
            Err(CabreviewError::InvalidEvent(_))
        ));
    }
}
