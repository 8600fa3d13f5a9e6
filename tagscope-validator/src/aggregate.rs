//! Result aggregation
//!
//! Turns a [`ValidationPartition`] into the reportable summary: partition
//! counts, per-field error counts over the mismatched entries, and
//! per-screen event counts over the whole expected set. Total over any
//! partition, including the empty one.

use tagscope_common::model::{
    CappedSummary, FieldErrorCount, ScreenCount, ValidationPartition, ValidationSummary,
    MAX_EXCERPT_EXAMPLES, MAX_EXCERPT_IDS,
};
use tagscope_common::schema::{FIELD_SCHEMA, SCREEN, UNSPECIFIED_SCREEN};
use tagscope_common::EventRecord;

/// Build the aggregate summary for one validation run.
///
/// Per-field counts increment once per differing field per mismatched
/// entry: an entry with three diffs contributes one to each of three
/// counters. Screen counts bucket every expected record, not just the
/// mismatched ones.
pub fn aggregate(partition: &ValidationPartition) -> ValidationSummary {
    let mut summary = ValidationSummary {
        total_expected: partition.total(),
        correct: partition.correct.len(),
        missing: partition.missing.len(),
        mismatched: partition.mismatched.len(),
        errors_by_field: Vec::new(),
        events_by_screen: Vec::new(),
    };

    for field in FIELD_SCHEMA {
        let count = partition
            .mismatched
            .iter()
            .filter(|entry| entry.diff_for(field).is_some())
            .count();
        if count > 0 {
            summary.errors_by_field.push(FieldErrorCount {
                field: field.to_string(),
                count,
            });
        }
    }

    for record in expected_records(partition) {
        let screen = record.field(SCREEN).trim();
        let bucket = if screen.is_empty() {
            UNSPECIFIED_SCREEN
        } else {
            screen
        };
        match summary.events_by_screen.iter_mut().find(|s| s.screen == bucket) {
            Some(entry) => entry.count += 1,
            None => summary.events_by_screen.push(ScreenCount {
                screen: bucket.to_string(),
                count: 1,
            }),
        }
    }

    summary
}

/// Build the size-capped excerpt handed to the narrative collaborator.
///
/// First [`MAX_EXCERPT_IDS`] missing/error ids and first
/// [`MAX_EXCERPT_EXAMPLES`] full mismatch examples; downstream consumers
/// rely on this bound for output size.
pub fn capped_summary(partition: &ValidationPartition) -> CappedSummary {
    let summary = aggregate(partition);
    CappedSummary {
        total_expected: summary.total_expected,
        correct: summary.correct,
        missing: summary.missing,
        mismatched: summary.mismatched,
        missing_ids: partition
            .missing
            .iter()
            .filter_map(|record| record.id)
            .take(MAX_EXCERPT_IDS)
            .collect(),
        error_ids: partition
            .mismatched
            .iter()
            .map(|entry| entry.id)
            .take(MAX_EXCERPT_IDS)
            .collect(),
        errors_by_field: summary.errors_by_field,
        examples: partition
            .mismatched
            .iter()
            .take(MAX_EXCERPT_EXAMPLES)
            .cloned()
            .collect(),
    }
}

fn expected_records(partition: &ValidationPartition) -> impl Iterator<Item = &EventRecord> + '_ {
    partition
        .missing
        .iter()
        .chain(partition.mismatched.iter().map(|entry| &entry.expected))
        .chain(partition.correct.iter())
}
