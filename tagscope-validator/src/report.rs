//! Report generation
//!
//! Renders the reconciliation outcome into the delivered artifacts: a
//! plain-text validation report, JSON detail files, and the nested
//! dashboard data structure consumed by the dashboard renderer. All
//! rendering is pure string/value building; only `write_all` touches the
//! filesystem.

use chrono::Local;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tagscope_common::model::{ValidationPartition, ValidationSummary};
use tagscope_common::schema::{EVENT_NAME, FEATURE, NOT_SET, SCREEN};
use tagscope_common::{EventRecord, Result};
use tracing::info;

use crate::export::sanitize_name;

const TEXT_REPORT_FILE: &str = "validation_report.txt";
const MISSING_JSON_FILE: &str = "missing_events.json";
const MISMATCH_JSON_FILE: &str = "field_mismatches.json";
const DASHBOARD_DATA_FILE: &str = "dashboard_data.json";

/// Paths of the artifacts written by one run.
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub text_report: PathBuf,
    pub missing_json: PathBuf,
    pub mismatch_json: PathBuf,
    pub dashboard_data: PathBuf,
}

/// Report directory for one validated feature:
/// `<base>/validation-reports/events/<feature>[/<sub_feature>]`.
pub fn report_directory(base: &Path, feature: &str, sub_feature: Option<&str>) -> PathBuf {
    let mut dir = base
        .join("validation-reports")
        .join("events")
        .join(sanitize_name(feature));
    if let Some(sub) = sub_feature {
        if !sub.trim().is_empty() {
            dir = dir.join(sanitize_name(sub));
        }
    }
    dir
}

/// Writes all report artifacts for one validation run.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Write the text report, JSON details, and dashboard data.
    pub fn write_all(
        &self,
        partition: &ValidationPartition,
        summary: &ValidationSummary,
        narrative: &str,
    ) -> Result<ReportArtifacts> {
        std::fs::create_dir_all(&self.output_dir)?;

        let missing_json = self.output_dir.join(MISSING_JSON_FILE);
        let missing = json!({
            "total_missing": partition.missing.len(),
            "events": &partition.missing,
        });
        std::fs::write(&missing_json, to_pretty(&missing)?)?;

        let mismatch_json = self.output_dir.join(MISMATCH_JSON_FILE);
        let mismatched = json!({
            "total_mismatched": partition.mismatched.len(),
            "events": &partition.mismatched,
        });
        std::fs::write(&mismatch_json, to_pretty(&mismatched)?)?;

        let text_report = self.output_dir.join(TEXT_REPORT_FILE);
        std::fs::write(&text_report, build_text_report(partition, summary, narrative))?;

        let dashboard_data = self.output_dir.join(DASHBOARD_DATA_FILE);
        std::fs::write(
            &dashboard_data,
            to_pretty(&dashboard_data_value(partition, summary, narrative))?,
        )?;

        info!(dir = %self.output_dir.display(), "Validation reports written");
        Ok(ReportArtifacts {
            text_report,
            missing_json,
            mismatch_json,
            dashboard_data,
        })
    }
}

fn to_pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| tagscope_common::Error::Internal(e.to_string()))
}

fn display_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Render the plain-text validation report.
pub fn build_text_report(
    partition: &ValidationPartition,
    summary: &ValidationSummary,
    narrative: &str,
) -> String {
    let now = Local::now();
    let date = now.format("%d/%m/%Y");
    let time = now.format("%H:%M:%S");
    let divider = "=".repeat(50);

    let mut out = String::new();
    out.push_str("# EVENT VALIDATION REPORT\n\n");
    out.push_str(&format!("Run date: {} at {}\n", date, time));
    out.push_str(&format!("{}\n\n", divider));

    // Executive summary
    out.push_str("## EXECUTIVE SUMMARY\n");
    out.push_str(&format!("{}\n", divider));
    let total = summary.total_expected;
    let percent = |count: usize| {
        if total > 0 {
            count as f64 / total as f64 * 100.0
        } else {
            0.0
        }
    };
    out.push_str(&format!(
        "Correct events:    {} ({:.1}%)\n",
        summary.correct,
        percent(summary.correct)
    ));
    out.push_str(&format!(
        "Missing events:    {} ({:.1}%)\n",
        summary.missing,
        percent(summary.missing)
    ));
    out.push_str(&format!(
        "Field mismatches:  {} ({:.1}%)\n",
        summary.mismatched,
        percent(summary.mismatched)
    ));
    out.push_str(&format!("Total processed:   {} events\n\n", total));

    // Missing events detail
    out.push_str("## MISSING EVENTS\n");
    out.push_str(&format!("{}\n", divider));
    if partition.missing.is_empty() {
        out.push_str("No missing events detected in this run.\n");
    } else {
        for (index, event) in partition.missing.iter().enumerate() {
            out.push_str(&format!("### Missing event #{}\n", index + 1));
            out.push_str(&format!("- ID: {}\n", id_display(event)));
            out.push_str(&format!(
                "- Screen: {}\n",
                display_or(event.field(SCREEN), NOT_SET)
            ));
            out.push_str(&format!(
                "- Event: {}\n",
                display_or(event.field(EVENT_NAME), NOT_SET)
            ));
            for (name, value) in event.fields_in_order() {
                if name != SCREEN && name != EVENT_NAME && !value.trim().is_empty() {
                    out.push_str(&format!("- {}: {}\n", name, value));
                }
            }
            out.push('\n');
        }
    }

    // Mismatch detail
    out.push_str("## EVENTS WITH INCORRECT FIELDS\n");
    out.push_str(&format!("{}\n", divider));
    if partition.mismatched.is_empty() {
        out.push_str("No field mismatches detected in this run.\n");
    } else {
        for (index, entry) in partition.mismatched.iter().enumerate() {
            out.push_str(&format!("### Mismatched event #{}\n", index + 1));
            out.push_str(&format!("- ID: {}\n", entry.id));
            out.push_str(&format!(
                "- Screen: {}\n",
                display_or(entry.expected.field(SCREEN), NOT_SET)
            ));
            out.push_str(&format!(
                "- Event: {}\n",
                display_or(entry.expected.field(EVENT_NAME), NOT_SET)
            ));
            out.push_str("Detected discrepancies:\n");
            for diff in &entry.diffs {
                out.push_str(&format!("{}:\n", diff.field));
                out.push_str(&format!("- Expected: {}\n", diff.expected_display()));
                out.push_str(&format!("+ Observed: {}\n", diff.observed_display()));
            }
            out.push('\n');
        }
    }

    // Narrative analysis
    out.push_str("## DETAILED ANALYSIS\n");
    out.push_str(&format!("{}\n", divider));
    out.push_str(narrative);
    out.push('\n');

    // Conclusion
    out.push_str("\n## CONCLUSION\n");
    out.push_str(&format!("{}\n", divider));
    if summary.correct == total && total > 0 {
        out.push_str("VALIDATION APPROVED\n\n");
        out.push_str("All events are implemented correctly.\n");
    } else if summary.correct_percent() >= 90.0 {
        out.push_str("VALIDATION PASSED WITH RESERVATIONS\n\n");
        out.push_str(&format!(
            "{} problems need attention, but the implementation is mostly correct ({:.1}%).\n",
            summary.missing + summary.mismatched,
            summary.correct_percent()
        ));
    } else {
        out.push_str("VALIDATION FAILED\n\n");
        out.push_str(&format!(
            "Significant problems were identified. Only {:.1}% of the events are correct.\n",
            summary.correct_percent()
        ));
    }

    out.push_str(&format!("\n{}\n", divider));
    out.push_str("Report generated by the tagscope event validation pipeline\n");
    out.push_str(&format!(
        "Version: {} | Date: {} | Time: {}\n",
        env!("CARGO_PKG_VERSION"),
        date,
        time
    ));

    out
}

/// Build the nested dashboard data structure.
pub fn dashboard_data_value(
    partition: &ValidationPartition,
    summary: &ValidationSummary,
    narrative: &str,
) -> Value {
    let errors_by_field: Value = summary
        .errors_by_field
        .iter()
        .map(|e| (e.field.clone(), json!(e.count)))
        .collect::<serde_json::Map<String, Value>>()
        .into();
    let events_by_screen: Value = summary
        .events_by_screen
        .iter()
        .map(|s| (s.screen.clone(), json!(s.count)))
        .collect::<serde_json::Map<String, Value>>()
        .into();

    let missing: Vec<Value> = partition
        .missing
        .iter()
        .map(|event| {
            json!({
                "id": event.id,
                "event": event,
                "event_name": display_or(event.field(EVENT_NAME), NOT_SET),
                "screen": display_or(event.field(SCREEN), NOT_SET),
                "feature": display_or(event.field(FEATURE), NOT_SET),
            })
        })
        .collect();

    json!({
        "summary": {
            "correct": summary.correct,
            "missing": summary.missing,
            "mismatched": summary.mismatched,
            "total": summary.total_expected,
        },
        "errors_by_field": errors_by_field,
        "events_by_screen": events_by_screen,
        "events": {
            "correct": &partition.correct,
            "missing": missing,
            "mismatched": &partition.mismatched,
        },
        "narrative": narrative,
    })
}

fn id_display(event: &EventRecord) -> String {
    event
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
