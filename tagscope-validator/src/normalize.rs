//! Field value normalization
//!
//! Both record sequences pass through [`normalize`] before any comparison.
//! Normalization is intentionally minimal: trim leading/trailing
//! whitespace, nothing else. No case folding, no type coercion; matching
//! stays exact-after-trim.

use tagscope_common::EventRecord;

/// Derive a comparison copy of `record` with every field trimmed.
///
/// Pure and idempotent; the id is preserved and the input is not mutated.
pub fn normalize(record: &EventRecord) -> EventRecord {
    record.map_fields(|value| value.trim().to_string())
}
