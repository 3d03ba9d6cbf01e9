// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./cabreview.toml` > `~/.config/cabreview/cabreview.toml` >
//! `/etc/cabreview/cabreview.toml` with environment variable overrides via `CABREVIEW_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CabreviewConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/cabreview/cabreview.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "cabreview.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/cabreview/cabreview.toml` (system-wide)
/// 3. `~/.config/cabreview/cabreview.toml` (user XDG config)
/// 4. `./cabreview.toml` (local directory)
/// 5. `CABREVIEW_*` environment variables
pub fn load_config() -> Result<CabreviewConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CabreviewConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CabreviewConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CabreviewConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CabreviewConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("cabreview").join(LOCAL_CONFIG_FILE))
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CabreviewConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CABREVIEW_REVIEW_MASTER_API_TOKEN` must map to
/// `review_master.api_token`, not `review.master.api.token`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("CABREVIEW_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config key.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 5] = ["review_master", "service", "storage", "dispatch", "http"];
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
