// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Barred telephone prefixes.
//!
//! Loaded once at startup from a newline-delimited file and read-only after
//! that. Prefixes carry the country code (`447418`, not `07418`).

use std::path::Path;

use tracing::{error, info};

/// Ordered list of barred prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarredPrefixes {
    prefixes: Vec<String>,
}

impl BarredPrefixes {
    /// Parse file content: one prefix per line, blank lines and `#` comments skipped.
    pub fn from_lines(content: &str) -> Self {
        let prefixes = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { prefixes }
    }

    /// Load the prefix file.
    ///
    /// An unreadable file is logged and yields an empty set; delivery carries
    /// on without barring rather than refusing to start.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let barred = Self::from_lines(&content);
                info!(path = %path.display(), count = barred.len(), "barred prefixes loaded");
                barred
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot read barred prefix file, barring nothing");
                Self::default()
            }
        }
    }

    /// True when `telephone` starts with any barred prefix.
    pub fn is_barred(&self, telephone: &str) -> bool {
        self.prefixes.iter().any(|p| telephone.starts_with(p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}
