//! Fixed placeholder strings written instead of real data.
//!
//! Downstream steps recognise them by prefix and skip their own work.

use std::fmt::Display;

/// Prefix of every contained failure.
pub const FAILURE_TAG: &str = "[SYSTEM ALERT]";

/// Extracted text when the run has no usable document.
pub const NO_DOCUMENT: &str = "[NO DOCUMENT] No document was provided with this request.";

/// Retrieved context when retrieval was skipped or failed.
pub const CONTEXT_UNAVAILABLE: &str =
    "[CONTEXT UNAVAILABLE] No clinical context could be retrieved for this request.";

const SENTINEL_PREFIXES: [&str; 3] = [FAILURE_TAG, "[NO DOCUMENT]", "[CONTEXT UNAVAILABLE]"];

/// Failure-tagged text for a step that could not produce its field.
pub fn failure(step: &str, error: impl Display) -> String {
    format!("{} {} failed: {}", FAILURE_TAG, step, error)
}

pub fn is_failure(text: &str) -> bool {
    text.trim_start().starts_with(FAILURE_TAG)
}

/// True for failure, no-document and context-unavailable placeholders.
pub fn is_sentinel(text: &str) -> bool {
    let text = text.trim_start();
    SENTINEL_PREFIXES
        .iter()
        .any(|prefix| text.starts_with(prefix))
}
