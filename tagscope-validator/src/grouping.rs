//! Feature grouping side channel
//!
//! Clusters extracted records into named buckets by their FEATURE field,
//! for bucketed export independent of the comparison pipeline. Buckets
//! appear in first-seen order and are order-preserving within; records
//! with an empty feature land in the explicit no-feature bucket.

use std::collections::HashMap;
use tagscope_common::schema::{FEATURE, NO_FEATURE_BUCKET};
use tagscope_common::EventRecord;

/// Accumulating grouping buckets, owned by the capture orchestrator.
#[derive(Debug, Clone, Default)]
pub struct FeatureGroups {
    order: Vec<String>,
    buckets: HashMap<String, Vec<EventRecord>>,
}

impl FeatureGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket one extracted record by its feature value.
    pub fn push(&mut self, record: EventRecord) {
        let feature = record.field(FEATURE).trim();
        let bucket = if feature.is_empty() {
            NO_FEATURE_BUCKET.to_string()
        } else {
            feature.to_string()
        };
        if !self.buckets.contains_key(&bucket) {
            self.order.push(bucket.clone());
        }
        self.buckets.entry(bucket).or_default().push(record);
    }

    /// Buckets in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[EventRecord])> + '_ {
        self.order.iter().map(|name| {
            (
                name.as_str(),
                self.buckets.get(name).map(Vec::as_slice).unwrap_or(&[]),
            )
        })
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Discard all buckets; the next capture session starts clean.
    pub fn reset(&mut self) {
        self.order.clear();
        self.buckets.clear();
    }
}
