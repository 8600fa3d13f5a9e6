//! Grouped-log export
//!
//! Writes captured events as CSV files organized by feature and optional
//! sub-feature: one file per (group, sub-group), header row first, data
//! rows in the fixed 18-column schema order.

use crate::grouping::FeatureGroups;
use chrono::Local;
use std::path::{Path, PathBuf};
use tagscope_common::schema::{FIELD_SCHEMA, NO_FEATURE_BUCKET, SUB_FEATURE};
use tagscope_common::{EventRecord, Result};
use tracing::info;

/// Sanitize a feature name for use as a path component.
///
/// Keeps alphanumerics, spaces, `_` and `-`; spaces become underscores.
/// Empty input maps to the no-feature bucket name.
pub fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_' || *c == '-')
        .collect();
    let sanitized = sanitized.trim().replace(' ', "_");
    if sanitized.is_empty() {
        NO_FEATURE_BUCKET.to_string()
    } else {
        sanitized
    }
}

/// Write every group to `<base_dir>/<feature>[/<sub_feature>]/<name>_<timestamp>.csv`.
///
/// Returns the paths written, in group order.
pub fn export_groups(groups: &FeatureGroups, base_dir: &Path) -> Result<Vec<PathBuf>> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut written = Vec::new();

    for (feature, records) in groups.iter() {
        for (sub_feature, sub_records) in split_by_sub_feature(records) {
            let safe_feature = sanitize_name(feature);
            let (dir, file_stem) = match &sub_feature {
                Some(sub) => {
                    let safe_sub = sanitize_name(sub);
                    (
                        base_dir.join(&safe_feature).join(&safe_sub),
                        format!("{}_{}_{}", safe_feature, safe_sub, timestamp),
                    )
                }
                None => (
                    base_dir.join(&safe_feature),
                    format!("{}_{}", safe_feature, timestamp),
                ),
            };
            std::fs::create_dir_all(&dir)?;

            let path = dir.join(format!("{}.csv", file_stem));
            write_group_csv(&path, &sub_records)?;
            info!(path = %path.display(), events = sub_records.len(), "Exported log group");
            written.push(path);
        }
    }

    Ok(written)
}

/// Partition one bucket's records by SUB_FEATURE, order-preserving.
/// Records without a sub-feature stay in a `None` partition.
fn split_by_sub_feature(records: &[EventRecord]) -> Vec<(Option<String>, Vec<&EventRecord>)> {
    let mut order: Vec<Option<String>> = Vec::new();
    let mut partitions: Vec<Vec<&EventRecord>> = Vec::new();

    for record in records {
        let sub = record.field(SUB_FEATURE).trim();
        let key = if sub.is_empty() { None } else { Some(sub.to_string()) };
        match order.iter().position(|k| *k == key) {
            Some(idx) => partitions[idx].push(record),
            None => {
                order.push(key);
                partitions.push(vec![record]);
            }
        }
    }

    order.into_iter().zip(partitions).collect()
}

fn write_group_csv(path: &Path, records: &[&EventRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(FIELD_SCHEMA)?;
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}
