//! Expected/observed reconciliation
//!
//! For each expected record, in input order, find a corresponding observed
//! record under a two-tier strategy and diff the full schema:
//!
//! 1. Tier 1, identity: an observed record carrying the same id. Ids only
//!    exist on records that came from tabular input, so this tier is a
//!    fast path for re-loaded exports.
//! 2. Tier 2, structural: an observed record equal on all 18 fields.
//!
//! First match wins in both tiers, and matches are not removed from the
//! observed pool. No match at all is the normal "missing" outcome, never
//! an error. A single differing character fails tier 2 by design; the
//! record then surfaces as missing rather than as a near-match.

use crate::normalize::normalize;
use tagscope_common::model::{FieldDiff, ReconciliationEntry, ValidationPartition};
use tagscope_common::schema::FIELD_SCHEMA;
use tagscope_common::{Error, EventRecord, Result};
use tracing::debug;

/// Partition the expected set against the observed set.
///
/// Fails only on contract violations (a record without the full schema,
/// or an expected record without an id); data-content outcomes are always
/// expressed through the partition.
pub fn reconcile(expected: &[EventRecord], observed: &[EventRecord]) -> Result<ValidationPartition> {
    for record in expected.iter().chain(observed.iter()) {
        if !record.has_full_schema() {
            return Err(Error::ContractViolation(
                "record is missing required schema fields".to_string(),
            ));
        }
    }

    let normalized_observed: Vec<EventRecord> = observed.iter().map(normalize).collect();
    let mut partition = ValidationPartition::default();

    for event in expected {
        let id = event.id.ok_or_else(|| {
            Error::ContractViolation("expected record has no id".to_string())
        })?;
        let normalized_event = normalize(event);

        // Tier 1: identity match
        let mut matched = normalized_observed
            .iter()
            .position(|o| o.id == Some(id));

        // Tier 2: full structural match
        if matched.is_none() {
            matched = normalized_observed.iter().position(|o| {
                FIELD_SCHEMA
                    .iter()
                    .all(|field| normalized_event.field(field) == o.field(field))
            });
        }

        let Some(index) = matched else {
            partition.missing.push(event.clone());
            continue;
        };

        let found = &normalized_observed[index];
        let diffs: Vec<FieldDiff> = FIELD_SCHEMA
            .iter()
            .filter_map(|field| {
                let expected_value = normalized_event.field(field);
                let observed_value = found.field(field);
                (expected_value != observed_value).then(|| FieldDiff {
                    field: field.to_string(),
                    expected: expected_value.to_string(),
                    observed: observed_value.to_string(),
                })
            })
            .collect();

        if diffs.is_empty() {
            partition.correct.push(event.clone());
        } else {
            debug!(id, diff_count = diffs.len(), "Matched event has field mismatches");
            partition.mismatched.push(ReconciliationEntry {
                id,
                expected: event.clone(),
                observed: observed[index].clone(),
                diffs,
            });
        }
    }

    Ok(partition)
}
