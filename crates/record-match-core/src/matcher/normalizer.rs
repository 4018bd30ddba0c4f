//! Field normalizer.
//!
//! Handles:
//! - Phone canonicalization (drop a leading `+1`, keep digits only)
//! - Text, email and date values, compared exactly as given

use serde::{Deserialize, Serialize};

/// Country-code prefix stripped from phone numbers.
const PHONE_COUNTRY_PREFIX: &str = "+1";

/// How a field value is canonicalized before comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Phone,
    Text,
    Date,
    Email,
}

/// Canonicalize `raw` for comparison. Never fails.
pub fn normalize(kind: FieldKind, raw: &str) -> String {
    match kind {
        FieldKind::Phone => normalize_phone(raw),
        // Display format is owned by the listing; compared as-is.
        FieldKind::Text | FieldKind::Date | FieldKind::Email => raw.to_string(),
    }
}

/// Strip a leading `+1`, then every non-digit.
pub fn normalize_phone(raw: &str) -> String {
    raw.strip_prefix(PHONE_COUNTRY_PREFIX)
        .unwrap_or(raw)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}
