// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cabreview dispatch` command implementation.
//!
//! Reads one event as a JSON object, runs it through the engine, and prints
//! the response body the integration expects. The disposition is logged.

use std::io::Read;

use cabreview_config::CabreviewConfig;
use cabreview_core::CabreviewError;
use cabreview_core::types::{InboundEvent, Integration};
use tracing::info;

use crate::runtime;

pub async fn run_dispatch(
    config: &CabreviewConfig,
    integration: Integration,
    source: &str,
) -> Result<(), CabreviewError> {
    let event = parse_event(&read_source(source)?)?;

    let store = runtime::open_store(config).await?;
    let engine = runtime::build_engine(config, store.clone()).await?;
    let outcome = engine.dispatch(integration, &event).await;
    info!(%integration, status = ?outcome.status, "event evaluated");
    store.close().await?;

    println!("{}", outcome.body);
    Ok(())
}

fn read_source(source: &str) -> Result<String, CabreviewError> {
    if source == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CabreviewError::InvalidEvent(format!("failed to read stdin: {e}")))?;
        return Ok(content);
    }
    std::fs::read_to_string(source)
        .map_err(|e| CabreviewError::InvalidEvent(format!("failed to read {source}: {e}")))
}

/// Parses a JSON object into event fields.
///
/// Numbers and booleans are accepted and kept in their JSON spelling; nulls
/// are dropped. Nested values are rejected.
pub fn parse_event(content: &str) -> Result<InboundEvent, CabreviewError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| CabreviewError::InvalidEvent(format!("event is not valid JSON: {e}")))?;
    let serde_json::Value::Object(fields) = value else {
        return Err(CabreviewError::InvalidEvent(
            "event must be a JSON object".into(),
        ));
    };

    let mut event = InboundEvent::new();
    for (name, value) in fields {
        match value {
            serde_json::Value::String(s) => event.insert(name, s),
            serde_json::Value::Number(n) => event.insert(name, n.to_string()),
            serde_json::Value::Bool(b) => event.insert(name, if b { "1" } else { "0" }),
            serde_json::Value::Null => {}
            _ => {
                return Err(CabreviewError::InvalidEvent(format!(
                    "field {name:?} must be a string"
                )));
            }
        }
    }
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_object() {
        let event = parse_event(
            r#"{"gr_token":"tok","tel":"07123456789","client":42,"ignore_telephone_checks":true,"note":null}"#,
        )
        .unwrap();
        assert_eq!(event.token(), "tok");
        assert_eq!(event.field("client"), "42");
        assert!(event.flag("ignore_telephone_checks"));
        assert!(!event.params().contains_key("note"));
    }

    #[test]
    fn rejects_non_objects_and_nested_fields() {
        assert!(matches!(parse_event("[1,2]"), Err(CabreviewError::InvalidEvent(_))));
        assert!(matches!(parse_event("{"), Err(CabreviewError::InvalidEvent(_))));
        assert!(matches!(
            parse_event(r#"{"tel":{"number":"1"}}"#),
            Err(CabreviewError::InvalidEvent(_))
        ));
    }

    #[test]
    fn reads_event_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"gr_token":"tok"}"#).unwrap();
        let content = read_source(path.to_str().unwrap()).unwrap();
        assert_eq!(parse_event(&content).unwrap().token(), "tok");
        assert!(read_source(dir.path().join("missing.json").to_str().unwrap()).is_err());
    }
}
