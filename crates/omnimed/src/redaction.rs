//! PHI redaction for extracted document text.
//!
//! Categories are masked in a fixed order: phone numbers, email addresses,
//! national ID numbers, calendar dates. Each match is replaced by a
//! category placeholder that contains no digits and no `@`, so running the
//! engine over its own output finds nothing new.
//!
//! Phone numbers are the first category but must not eat the digits of an
//! email address that is masked right after them, so phones are only
//! searched for in the text between email addresses. IDs and dates cannot
//! overlap: an ID is an unbroken run of 9-12 digits and a date always
//! contains separators. Digits are ASCII only.
//!
//! A local number written without separators is only a phone when it is a
//! 10-digit mobile number (`03`, `05`, `07`, `08`, `09`). Any other bare
//! run of 9-12 digits, including one with a leading zero, is a national ID.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use serde::Serialize;

static RE_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\+[0-9]{1,3}[\s.-]?[0-9]{1,4}(?:[\s.-]?[0-9]{2,4}){2,3}|\b0[0-9]{2,3}[\s.-][0-9]{3}[\s.-]?[0-9]{3,4}|\b0[35789][0-9]{8})\b",
    )
    .unwrap()
});
static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static RE_NATIONAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]{9,12}\b").unwrap());
static RE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]{1,2}[/-][0-9]{1,2}[/-][0-9]{4}\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionCategory {
    Phone,
    Email,
    NationalId,
    Date,
}

impl RedactionCategory {
    /// Application order.
    pub const ALL: [RedactionCategory; 4] = [
        RedactionCategory::Phone,
        RedactionCategory::Email,
        RedactionCategory::NationalId,
        RedactionCategory::Date,
    ];

    pub fn placeholder(&self) -> &'static str {
        match self {
            RedactionCategory::Phone => "[PHONE]",
            RedactionCategory::Email => "[EMAIL]",
            RedactionCategory::NationalId => "[NATIONAL_ID]",
            RedactionCategory::Date => "[DATE]",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            RedactionCategory::Phone => &RE_PHONE,
            RedactionCategory::Email => &RE_EMAIL,
            RedactionCategory::NationalId => &RE_NATIONAL_ID,
            RedactionCategory::Date => &RE_DATE,
        }
    }
}

/// Redacted text plus how many values of each category were masked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RedactionSummary {
    pub text: String,
    pub phones: usize,
    pub emails: usize,
    pub national_ids: usize,
    pub dates: usize,
}

impl RedactionSummary {
    pub fn total(&self) -> usize {
        self.phones + self.emails + self.national_ids + self.dates
    }

    fn record(&mut self, category: RedactionCategory, count: usize) {
        match category {
            RedactionCategory::Phone => self.phones += count,
            RedactionCategory::Email => self.emails += count,
            RedactionCategory::NationalId => self.national_ids += count,
            RedactionCategory::Date => self.dates += count,
        }
    }
}

/// Masks phone numbers, emails, national IDs and dates in `text`.
///
/// Total and idempotent: `redact(&redact(x)) == redact(x)`.
pub fn redact(text: &str) -> String {
    redact_with_summary(text).text
}

/// Like [`redact`] but also reports per-category counts (for logging).
pub fn redact_with_summary(text: &str) -> RedactionSummary {
    let mut summary = RedactionSummary::default();
    if text.is_empty() {
        return summary;
    }

    let mut current = text.to_string();
    for category in RedactionCategory::ALL {
        let (masked, count) = match category {
            RedactionCategory::Phone => {
                let emails = spans(&RE_EMAIL, &current);
                mask_outside(&current, category, &emails)
            }
            _ => mask(&current, category),
        };
        summary.record(category, count);
        current = masked;
    }

    summary.text = current;
    summary
}

fn spans(pattern: &Regex, text: &str) -> Vec<Range<usize>> {
    pattern.find_iter(text).map(|m| m.range()).collect()
}

fn mask(text: &str, category: RedactionCategory) -> (String, usize) {
    let pattern = category.pattern();
    let count = pattern.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    let masked = pattern
        .replace_all(text, NoExpand(category.placeholder()))
        .into_owned();
    (masked, count)
}

/// Masks `category` in the gaps between `skip` spans, copying the spans as is.
fn mask_outside(
    text: &str,
    category: RedactionCategory,
    skip: &[Range<usize>],
) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut count = 0;
    let mut cursor = 0;
    for span in skip {
        let (masked, n) = mask(&text[cursor..span.start], category);
        out.push_str(&masked);
        out.push_str(&text[span.clone()]);
        count += n;
        cursor = span.end;
    }
    let (masked, n) = mask(&text[cursor..], category);
    out.push_str(&masked);
    (out, count + n)
}
