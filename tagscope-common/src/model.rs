//! Event record model and validation result types
//!
//! `EventRecord` is the canonical in-memory representation of one tagging
//! event. Both ingestion paths (spreadsheet rows and extracted log
//! payloads) construct it through [`EventRecord::new`], which completes the
//! fixed schema: every record carries all 18 fields, with missing source
//! data stored as the empty string. Records are immutable after
//! construction; normalization derives a copy.

use crate::schema::{FIELD_SCHEMA, NOT_SET};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cap on identifier lists handed to the narrative collaborator.
pub const MAX_EXCERPT_IDS: usize = 20;

/// Cap on full mismatch examples handed to the narrative collaborator.
pub const MAX_EXCERPT_EXAMPLES: usize = 3;

/// One tagging event, from either source.
///
/// `id` is the 1-based spreadsheet row identity; log-sourced records have
/// no stable identity and carry `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Option<u32>,
    fields: HashMap<String, String>,
}

impl EventRecord {
    /// Build a record from source fields.
    ///
    /// Keys outside the fixed schema are discarded; schema keys absent
    /// from `fields` become empty strings.
    pub fn new(id: Option<u32>, fields: HashMap<String, String>) -> Self {
        let mut complete = HashMap::with_capacity(FIELD_SCHEMA.len());
        for name in FIELD_SCHEMA {
            let value = fields.get(name).cloned().unwrap_or_default();
            complete.insert(name.to_string(), value);
        }
        Self { id, fields: complete }
    }

    /// Field value by canonical name; empty string for unset fields.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    /// Fields in schema order, for row export and diffing.
    pub fn fields_in_order(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        FIELD_SCHEMA.iter().map(|name| (*name, self.field(name)))
    }

    /// Values only, in schema order (one export row).
    pub fn to_row(&self) -> Vec<String> {
        FIELD_SCHEMA
            .iter()
            .map(|name| self.field(name).to_string())
            .collect()
    }

    /// Derive a copy with every field value trimmed and id preserved.
    pub fn map_fields<F: Fn(&str) -> String>(&self, f: F) -> Self {
        let fields = FIELD_SCHEMA
            .iter()
            .map(|name| (name.to_string(), f(self.field(name))))
            .collect();
        Self { id: self.id, fields }
    }

    /// Check the full-schema invariant.
    ///
    /// Always true for constructed records; deserialized records are
    /// re-checked before reconciliation.
    pub fn has_full_schema(&self) -> bool {
        FIELD_SCHEMA.iter().all(|name| self.fields.contains_key(*name))
    }
}

/// One mismatched field of a matched expected/observed pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub field: String,
    pub expected: String,
    pub observed: String,
}

impl FieldDiff {
    /// Expected value for reports, with the explicit not-set sentinel.
    pub fn expected_display(&self) -> &str {
        if self.expected.is_empty() {
            NOT_SET
        } else {
            &self.expected
        }
    }

    /// Observed value for reports, with the explicit not-set sentinel.
    pub fn observed_display(&self) -> &str {
        if self.observed.is_empty() {
            NOT_SET
        } else {
            &self.observed
        }
    }
}

/// A matched expected record with at least one differing field.
///
/// Carries the original (non-normalized) records; `diffs` is ordered by
/// schema position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationEntry {
    pub id: u32,
    pub expected: EventRecord,
    pub observed: EventRecord,
    pub diffs: Vec<FieldDiff>,
}

impl ReconciliationEntry {
    pub fn diff_for(&self, field: &str) -> Option<&FieldDiff> {
        self.diffs.iter().find(|d| d.field == field)
    }
}

/// Three-way classification of the expected record set.
///
/// Exhaustive and mutually exclusive: every expected record lands in
/// exactly one of the lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationPartition {
    pub missing: Vec<EventRecord>,
    pub mismatched: Vec<ReconciliationEntry>,
    pub correct: Vec<EventRecord>,
}

impl ValidationPartition {
    /// Number of expected records that were partitioned.
    pub fn total(&self) -> usize {
        self.missing.len() + self.mismatched.len() + self.correct.len()
    }
}

/// Error count for one schema field across all mismatched entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorCount {
    pub field: String,
    pub count: usize,
}

/// Expected-event count for one screen bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenCount {
    pub screen: String,
    pub count: usize,
}

/// Aggregate view of one validation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_expected: usize,
    pub correct: usize,
    pub missing: usize,
    pub mismatched: usize,
    /// Schema order; fields with zero errors omitted.
    pub errors_by_field: Vec<FieldErrorCount>,
    /// First-seen order over the expected set.
    pub events_by_screen: Vec<ScreenCount>,
}

impl ValidationSummary {
    pub fn error_count_for(&self, field: &str) -> usize {
        self.errors_by_field
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.count)
            .unwrap_or(0)
    }

    pub fn screen_count_for(&self, screen: &str) -> usize {
        self.events_by_screen
            .iter()
            .find(|s| s.screen == screen)
            .map(|s| s.count)
            .unwrap_or(0)
    }

    pub fn correct_percent(&self) -> f64 {
        if self.total_expected == 0 {
            0.0
        } else {
            self.correct as f64 / self.total_expected as f64 * 100.0
        }
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} correct, {} missing, {} mismatched of {} expected",
            self.correct, self.missing, self.mismatched, self.total_expected
        )
    }
}

/// Size-capped excerpt for the narrative collaborator.
///
/// Bounded output: at most [`MAX_EXCERPT_IDS`] identifiers per list and
/// [`MAX_EXCERPT_EXAMPLES`] full mismatch examples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CappedSummary {
    pub total_expected: usize,
    pub correct: usize,
    pub missing: usize,
    pub mismatched: usize,
    pub missing_ids: Vec<u32>,
    pub error_ids: Vec<u32>,
    pub errors_by_field: Vec<FieldErrorCount>,
    pub examples: Vec<ReconciliationEntry>,
}
