//! Report artifact tests: the generator writes every artifact and the
//! JSON ones parse back into the expected shapes.

use std::collections::HashMap;
use tagscope_common::EventRecord;
use tagscope_validator::aggregate;
use tagscope_validator::export::export_groups;
use tagscope_validator::reconcile;
use tagscope_validator::report::ReportGenerator;
use tagscope_validator::FeatureGroups;

fn record(id: Option<u32>, pairs: &[(&str, &str)]) -> EventRecord {
    let fields: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EventRecord::new(id, fields)
}

#[test]
fn write_all_produces_every_artifact() {
    let expected = vec![
        record(Some(1), &[("EVENT NAME", "tap"), ("SCREEN", "Home"), ("ACTION", "click")]),
        record(Some(2), &[("EVENT NAME", "view"), ("SCREEN", "Cart")]),
    ];
    let observed = vec![record(
        Some(1),
        &[("EVENT NAME", "tap"), ("SCREEN", "Home"), ("ACTION", "tap")],
    )];
    let partition = reconcile(&expected, &observed).unwrap();
    let summary = aggregate(&partition);

    let dir = tempfile::tempdir().unwrap();
    let generator = ReportGenerator::new(dir.path().join("reports"));
    let artifacts = generator
        .write_all(&partition, &summary, "[narrative analysis skipped]")
        .unwrap();

    assert!(artifacts.text_report.is_file());
    assert!(artifacts.missing_json.is_file());
    assert!(artifacts.mismatch_json.is_file());
    assert!(artifacts.dashboard_data.is_file());

    let missing: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&artifacts.missing_json).unwrap()).unwrap();
    assert_eq!(missing["total_missing"], 1);
    assert_eq!(missing["events"][0]["id"], 2);

    let mismatches: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&artifacts.mismatch_json).unwrap()).unwrap();
    assert_eq!(mismatches["total_mismatched"], 1);
    assert_eq!(mismatches["events"][0]["diffs"][0]["field"], "ACTION");

    let dashboard: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&artifacts.dashboard_data).unwrap()).unwrap();
    assert_eq!(dashboard["summary"]["total"], 2);
    assert_eq!(dashboard["narrative"], "[narrative analysis skipped]");

    let text = std::fs::read_to_string(&artifacts.text_report).unwrap();
    assert!(text.contains("EXECUTIVE SUMMARY"));
    assert!(text.contains("Total processed:   2 events"));
}

#[test]
fn grouped_export_writes_schema_ordered_rows() {
    let mut groups = FeatureGroups::new();
    groups.push(record(None, &[("EVENT NAME", "a"), ("FEATURE", "Checkout")]));
    groups.push(record(
        None,
        &[("EVENT NAME", "b"), ("FEATURE", "Checkout"), ("SUB_FEATURE", "Payment")],
    ));
    groups.push(record(None, &[("EVENT NAME", "c")]));

    let dir = tempfile::tempdir().unwrap();
    let written = export_groups(&groups, dir.path()).unwrap();
    assert_eq!(written.len(), 3);

    // no-feature bucket gets its own directory
    assert!(written
        .iter()
        .any(|p| p.starts_with(dir.path().join("no_feature"))));

    for path in &written {
        let content = std::fs::read_to_string(path).unwrap();
        let header = content.lines().next().unwrap();
        assert!(header.starts_with("EVENT NAME,ENVIRONMENT,PRODUCT,FEATURE"));
    }
}
