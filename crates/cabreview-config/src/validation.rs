// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, URL schemes, and timeout ranges.

use crate::diagnostic::ConfigError;
use crate::model::CabreviewConfig;

/// Accepted values for `service.log_level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Longest accepted outbound timeout.
const MAX_TIMEOUT_SECS: u64 = 300;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CabreviewConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{}` must be one of {}",
                config.service.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if matches!(&config.dispatch.barred_prefix_file, Some(path) if path.trim().is_empty()) {
        errors.push(ConfigError::Validation {
            message: "dispatch.barred_prefix_file must not be empty when set".to_string(),
        });
    }

    let url = config.review_master.url.trim();
    if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("review_master.url `{url}` must start with http:// or https://"),
        });
    }

    if config.http.timeout_secs == 0 || config.http.timeout_secs > MAX_TIMEOUT_SECS {
        errors.push(ConfigError::Validation {
            message: format!(
                "http.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {}",
                config.http.timeout_secs
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&CabreviewConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_problem() {
        let mut config = CabreviewConfig::default();
        config.service.log_level = "loud".into();
        config.storage.database_path = "  ".into();
        config.review_master.url = "ftp://gateway".into();
        config.http.timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn blank_barred_file_is_rejected() {
        let mut config = CabreviewConfig::default();
        config.dispatch.barred_prefix_file = Some(String::new());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("barred_prefix_file"));
    }
}
