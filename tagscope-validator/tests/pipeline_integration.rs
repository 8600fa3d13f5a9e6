//! End-to-end pipeline tests: tabular text and raw log lines in,
//! partition and summary out.

use tagscope_common::schema::{FIELD_SCHEMA, SCREEN, UNSPECIFIED_SCREEN};
use tagscope_validator::{aggregate, capped_summary, extract_all, load_events, reconcile};

fn expected_csv() -> String {
    let header = FIELD_SCHEMA.join(",");
    // Sheet exports usually carry a couple of preamble rows before the
    // header; the loader must skip them by content.
    format!(
        "Event tagging plan,v2\n\
         Owner,QA team\n\
         {header}\n\
         open_cart,prod,store,Checkout,,nav,Cart,view,page,,,,,,,,,\n\
         tap_buy,prod,store,Checkout,,interaction,Cart,click,button,buy now,,,,,,,,\n\
         tap_help,prod,store,Checkout,,interaction,,click,link,help,,,,,,,,\n"
    )
}

fn device_log() -> Vec<&'static str> {
    vec![
        "04-12 10:31:01.000 I/ActivityManager: unrelated noise",
        r#"04-12 10:31:02.114 D/Tagging: methodData:{"name":"open_cart","params":{"ambiente":"prod","produto":"store","funcionalidade":"Checkout","categoria":"nav","tela":"Cart","acao":"view","elemento":"page"}}"#,
        r#"04-12 10:31:03.008 D/Tagging: methodData:{"name":"tap_buy","params":{"ambiente":"prod","produto":"store","funcionalidade":"Checkout","categoria":"interaction","tela":"Cart","acao":"tap","elemento":"button","rotulo":"buy now"}}"#,
        "04-12 10:31:03.500 D/Tagging: methodData:{broken payload",
        r#"04-12 10:31:04.200 D/Tagging: methodData:{"name": oops}"#,
    ]
}

#[test]
fn csv_and_log_reconcile_into_exhaustive_partition() {
    let expected = load_events(expected_csv().as_bytes()).unwrap();
    assert_eq!(expected.len(), 3);

    let extraction = extract_all(device_log());
    assert_eq!(extraction.events.len(), 2);
    assert_eq!(extraction.malformed_lines, 1);

    let partition = reconcile(&expected, &extraction.events).unwrap();
    assert_eq!(partition.total(), expected.len());

    // open_cart matches structurally (log records carry no ids).
    assert_eq!(partition.correct.len(), 1);
    assert_eq!(partition.correct[0].field("EVENT NAME"), "open_cart");

    // tap_buy differs in ACTION only, so strict tier-2 matching cannot
    // recover it; both it and tap_help surface as missing.
    assert_eq!(partition.mismatched.len(), 0);
    assert_eq!(partition.missing.len(), 2);
}

#[test]
fn summary_reflects_partition_and_screen_buckets() {
    let expected = load_events(expected_csv().as_bytes()).unwrap();
    let extraction = extract_all(device_log());
    let partition = reconcile(&expected, &extraction.events).unwrap();
    let summary = aggregate(&partition);

    assert_eq!(summary.total_expected, 3);
    assert_eq!(summary.correct + summary.missing + summary.mismatched, 3);
    assert_eq!(summary.screen_count_for("Cart"), 2);
    assert_eq!(summary.screen_count_for(UNSPECIFIED_SCREEN), 1);
}

#[test]
fn capped_excerpt_lists_missing_ids() {
    let expected = load_events(expected_csv().as_bytes()).unwrap();
    let extraction = extract_all(device_log());
    let partition = reconcile(&expected, &extraction.events).unwrap();

    let excerpt = capped_summary(&partition);
    assert_eq!(excerpt.total_expected, 3);
    assert_eq!(excerpt.missing_ids, vec![2, 3]);
    assert!(excerpt.examples.is_empty());
}

#[test]
fn reloaded_export_reconciles_by_id() {
    // A CSV export of the observed events carries ids, so tier-1 identity
    // matching applies and field differences become mismatches instead of
    // missing events.
    let expected = load_events(expected_csv().as_bytes()).unwrap();

    let header = FIELD_SCHEMA.join(",");
    let observed_csv = format!(
        "{header}\n\
         open_cart,prod,store,Checkout,,nav,Cart,view,page,,,,,,,,,\n\
         tap_buy,prod,store,Checkout,,interaction,Cart,tap,button,buy now,,,,,,,,\n"
    );
    let observed = load_events(observed_csv.as_bytes()).unwrap();

    let partition = reconcile(&expected, &observed).unwrap();
    assert_eq!(partition.correct.len(), 1);
    assert_eq!(partition.mismatched.len(), 1);
    assert_eq!(partition.missing.len(), 1);

    let entry = &partition.mismatched[0];
    assert_eq!(entry.id, 2);
    let diff = entry.diff_for("ACTION").expect("action diff");
    assert_eq!(diff.expected, "click");
    assert_eq!(diff.observed, "tap");

    let summary = aggregate(&partition);
    assert_eq!(summary.error_count_for("ACTION"), 1);
    let counted: usize = summary.errors_by_field.iter().map(|e| e.count).sum();
    assert_eq!(counted, 1);
}

#[test]
fn screen_field_check() {
    // Guard against schema drift between the two ingestion paths: the
    // extractor's SCREEN must land where the loader's SCREEN lands.
    let expected = load_events(expected_csv().as_bytes()).unwrap();
    let extraction = extract_all(device_log());
    assert_eq!(expected[0].field(SCREEN), "Cart");
    assert_eq!(extraction.events[0].field(SCREEN), "Cart");
}
