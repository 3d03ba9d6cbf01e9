// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Cabreview configuration system.

use cabreview_config::diagnostic::ConfigError;
use cabreview_config::model::CabreviewConfig;
use cabreview_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_cabreview_config() {
    let toml = r#"
[service]
log_level = "debug"

[storage]
database_path = "/tmp/cabreview-test.db"

[dispatch]
barred_prefix_file = "/etc/cabreview/barred.txt"
refresh_master_queue_on_start = false

[review_master]
url = "https://sms.example.com/api/messages"
api_token = "rm-token"

[http]
timeout_secs = 20
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/cabreview-test.db");
    assert_eq!(
        config.dispatch.barred_prefix_file.as_deref(),
        Some("/etc/cabreview/barred.txt")
    );
    assert!(!config.dispatch.refresh_master_queue_on_start);
    assert_eq!(config.review_master.url, "https://sms.example.com/api/messages");
    assert_eq!(config.review_master.api_token, "rm-token");
    assert_eq!(config.http.timeout_secs, 20);
}

/// Missing sections fall back to defaults.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML is valid");
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.http.timeout_secs, 10);
    assert!(config.dispatch.barred_prefix_file.is_none());
    assert!(config.dispatch.refresh_master_queue_on_start);
    assert!(config.review_master.url.is_empty());
    assert!(config.storage.database_path.ends_with("cabreview.db"));
}

/// Unknown keys inside a section are rejected.
#[test]
fn unknown_field_in_section_produces_error() {
    let toml = r#"
[review_master]
api_tokn = "abc"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("api_tokn"),
        "error should mention the bad key, got: {err_str}"
    );
}

/// Unknown top-level sections are rejected.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[telegram]
bot_token = "abc"
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// A typo produces an UnknownKey diagnostic with a suggestion and the valid keys.
#[test]
fn diagnostic_suggests_closest_key() {
    let toml = r#"
[review_master]
api_tokn = "abc"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let matched = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "api_tokn"
                && suggestion.as_deref() == Some("api_token")
                && valid_keys.contains("url")
        })
    });
    assert!(matched, "expected UnknownKey for api_tokn, got: {errors:?}");
}

/// A wrong value type is reported with the offending key.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[http]
timeout_secs = "ten"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("timeout_secs"))),
        "expected InvalidType for timeout_secs, got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_rejects_out_of_range_timeout() {
    let toml = r#"
[http]
timeout_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero timeout is invalid");
    assert!(matches!(&errors[0], ConfigError::Validation { message } if message.contains("timeout_secs")));
}

/// Defaults serialize and reparse into the same values.
#[test]
fn serialized_defaults_are_loadable() {
    let json = serde_json::to_value(CabreviewConfig::default()).expect("serialize defaults");
    assert_eq!(json["http"]["timeout_secs"], 10);
    assert_eq!(json["service"]["log_level"], "info");
}

/// Loading from an explicit file reads the file and validates it.
#[test]
fn load_and_validate_path_reads_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cabreview.toml");
    std::fs::write(
        &path,
        r#"
[storage]
database_path = "/var/lib/cabreview/state.db"
"#,
    )
    .expect("write config");

    let config = load_and_validate_path(&path).expect("valid file");
    assert_eq!(config.storage.database_path, "/var/lib/cabreview/state.db");
}

/// Errors from an explicit file name the unknown key.
#[test]
fn load_and_validate_path_reports_unknown_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cabreview.toml");
    std::fs::write(&path, "[http]\ntimeout_sec = 5\n").expect("write config");

    let errors = load_and_validate_path(&path).expect_err("unknown key");
    let matched = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, .. }
            if key == "timeout_sec" && suggestion.as_deref() == Some("timeout_secs"))
    });
    assert!(matched, "expected UnknownKey for timeout_sec, got: {errors:?}");
}
