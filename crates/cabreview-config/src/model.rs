// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Cabreview dispatch service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.
//!
//! Per-tenant policy is not configured here: it lives in the store and is
//! read fresh for every event.

use serde::{Deserialize, Serialize};

/// Top-level Cabreview configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CabreviewConfig {
    /// Process-wide service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Dispatch engine startup settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Review-Master SMS gateway settings.
    #[serde(default)]
    pub review_master: ReviewMasterConfig,

    /// Outbound HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Process-wide service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("cabreview").join("cabreview.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("cabreview.db"))
        .to_string_lossy()
        .into_owned()
}

/// Dispatch engine startup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Newline-delimited barred telephone prefixes (`#` starts a comment).
    /// Unset or unreadable means no prefixes are barred.
    #[serde(default)]
    pub barred_prefix_file: Option<String>,

    /// Load the Review-Master master queue id from the store at startup.
    #[serde(default = "default_true")]
    pub refresh_master_queue_on_start: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            barred_prefix_file: None,
            refresh_master_queue_on_start: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Review-Master SMS gateway configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewMasterConfig {
    /// Endpoint messages are posted to.
    #[serde(default)]
    pub url: String,

    /// Value of the `api-token` header.
    #[serde(default)]
    pub api_token: String,
}

/// Outbound HTTP transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Connect, idle, and overall request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}
