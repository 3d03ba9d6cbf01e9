// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message text resolution and multi-message selection.

use cabreview_core::types::MessageSettings;
use rand::Rng;

/// The candidate message: the tenant's stored text, or the inbound field.
pub fn resolve_message(settings: &MessageSettings, event_message: &str) -> String {
    if settings.use_database_message {
        settings.message.clone()
    } else {
        event_message.trim().to_string()
    }
}

/// Pick the final message.
///
/// With multi-message disabled the text is returned unchanged. Enabled, the
/// separator is trimmed of spaces; an empty message or separator gives `""`,
/// otherwise one segment of the split is chosen uniformly at random.
pub fn select_message<R: Rng + ?Sized>(
    message: &str,
    multi_message_enabled: bool,
    separator: &str,
    rng: &mut R,
) -> String {
    if !multi_message_enabled {
        return message.to_string();
    }
    let separator = separator.trim_matches(' ');
    if message.is_empty() || separator.is_empty() {
        return String::new();
    }
    let segments: Vec<&str> = message.split(separator).collect();
    segments[rng.gen_range(0..segments.len())].to_string()
}
