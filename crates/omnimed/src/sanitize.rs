//! Helpers for keeping patient data out of tracing span attributes.
//!
//! Spans are shared when debugging a deployment, so they only ever carry a
//! document's file name and a hash of the patient identifier.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Same as [`redact_path`] for an optional document.
pub fn redact_optional_path(path: Option<&Path>) -> String {
    path.map(redact_path).unwrap_or_else(|| "<none>".to_string())
}

/// Short deterministic hash of an identifier (patient id, session id) for
/// correlating log lines without exposing the identifier itself.
pub fn hash_identifier(value: &str) -> String {
    if value.trim().is_empty() {
        return "<anonymous>".to_string();
    }
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Truncates text for log messages, cutting on a char boundary.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
