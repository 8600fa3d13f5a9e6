//! Log event extractor
//!
//! Scans raw device log lines for embedded event payloads. A line
//! qualifies when it carries the `methodData:` marker followed by a JSON
//! object; the payload uses the tagging SDK's own key names, and this
//! module owns the translation onto the canonical schema.
//!
//! Extraction is per-line and stateless, so it works identically on a
//! materialized text blob and on a live capture feed. A malformed payload
//! is warned about and skipped; it never aborts the run.

use crate::grouping::FeatureGroups;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use tagscope_common::EventRecord;
use tokio::sync::mpsc;
use tracing::warn;

/// Payload-parameter key -> canonical schema field.
const PARAM_KEY_MAP: [(&str, &str); 17] = [
    ("ambiente", "ENVIRONMENT"),
    ("produto", "PRODUCT"),
    ("funcionalidade", "FEATURE"),
    ("subFuncionalidade", "SUB_FEATURE"),
    ("categoria", "CATEGORY"),
    ("tela", "SCREEN"),
    ("acao", "ACTION"),
    ("elemento", "ELEMENT"),
    ("rotulo", "LABEL"),
    ("userId", "USER_ID"),
    ("tipo_usuario", "USER_TYPE"),
    ("opcao1", "SELECTED_OPTION_1"),
    ("opcao2", "SELECTED_OPTION_2"),
    ("opcao3", "SELECTED_OPTION_3"),
    ("opcao4", "SELECTED_OPTION_4"),
    ("opcao5", "SELECTED_OPTION_5"),
    ("opcao6", "SELECTED_OPTION_6"),
];

fn payload_re() -> &'static Regex {
    static PAYLOAD_RE: OnceLock<Regex> = OnceLock::new();
    PAYLOAD_RE.get_or_init(|| Regex::new(r"methodData:\s*(\{.*\})").expect("valid payload regex"))
}

/// Result of evaluating one log line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Line carried a parseable event payload.
    Event(EventRecord),
    /// Line had no payload marker; not an error.
    NoPayload,
    /// Line had the marker but the payload blob failed to parse.
    Malformed,
}

/// Everything extracted from one pass over a line sequence.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub events: Vec<EventRecord>,
    /// Lines that carried the marker but not a parseable payload.
    pub malformed_lines: usize,
}

/// Evaluate a single raw log line.
pub fn extract_line(line: &str) -> LineOutcome {
    let Some(captures) = payload_re().captures(line) else {
        return LineOutcome::NoPayload;
    };
    match serde_json::from_str::<Value>(&captures[1]) {
        Ok(payload) => LineOutcome::Event(record_from_payload(&payload)),
        Err(e) => {
            warn!(error = %e, "Skipping log line with malformed event payload");
            LineOutcome::Malformed
        }
    }
}

/// Extract every event from an in-memory line sequence.
pub fn extract_all<I, S>(lines: I) -> ExtractionReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = ExtractionReport::default();
    for line in lines {
        match extract_line(line.as_ref()) {
            LineOutcome::Event(event) => report.events.push(event),
            LineOutcome::Malformed => report.malformed_lines += 1,
            LineOutcome::NoPayload => {}
        }
    }
    report
}

/// Drain a capture feed line by line until the producer closes it.
///
/// The grouping buckets belong to the caller, who may discard or reset
/// them at any point; the extractor itself keeps no cross-call state.
/// Cancellation is cooperative: the capture side stops sending and drops
/// its sender.
pub async fn extract_from_channel(
    mut lines: mpsc::Receiver<String>,
    groups: &mut FeatureGroups,
) -> ExtractionReport {
    let mut report = ExtractionReport::default();
    while let Some(line) = lines.recv().await {
        match extract_line(&line) {
            LineOutcome::Event(event) => {
                groups.push(event.clone());
                report.events.push(event);
            }
            LineOutcome::Malformed => report.malformed_lines += 1,
            LineOutcome::NoPayload => {}
        }
    }
    report
}

/// Map a parsed `methodData` payload onto the canonical schema.
///
/// `name` at the top level is the event name; everything else lives under
/// `params`. Null and absent values become empty strings, non-string
/// scalars are stringified. Log-sourced records carry no stable id.
fn record_from_payload(payload: &Value) -> EventRecord {
    let mut fields = HashMap::new();
    fields.insert("EVENT NAME".to_string(), to_str(payload.get("name")));

    let params = payload.get("params");
    for (payload_key, schema_field) in PARAM_KEY_MAP {
        let value = params.and_then(|p| p.get(payload_key));
        fields.insert(schema_field.to_string(), to_str(value));
    }

    EventRecord::new(None, fields)
}

fn to_str(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagscope_common::schema::{EVENT_NAME, FEATURE, FIELD_SCHEMA, SCREEN};

    #[test]
    fn param_key_map_targets_are_schema_fields() {
        for (_, schema_field) in PARAM_KEY_MAP {
            assert!(FIELD_SCHEMA.contains(&schema_field), "{}", schema_field);
        }
    }

    #[test]
    fn extracts_event_from_marked_line() {
        let line = r#"04-12 10:31:02.114 D/Tagging: methodData:{"name":"tap_button","params":{"funcionalidade":"Checkout","tela":"Cart","acao":"click"}}"#;
        match extract_line(line) {
            LineOutcome::Event(event) => {
                assert_eq!(event.id, None);
                assert_eq!(event.field(EVENT_NAME), "tap_button");
                assert_eq!(event.field(FEATURE), "Checkout");
                assert_eq!(event.field(SCREEN), "Cart");
                assert_eq!(event.field("ACTION"), "click");
                assert_eq!(event.field("LABEL"), "");
            }
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[test]
    fn line_without_marker_is_silently_ignored() {
        assert_eq!(extract_line("I/ActivityManager: some unrelated noise"), LineOutcome::NoPayload);
    }

    #[test]
    fn malformed_payload_is_skipped_not_fatal() {
        let lines = [
            r#"methodData:{"name": not valid json}"#,
            r#"methodData:{"name":"ok","params":{"funcionalidade":"Login"}}"#,
        ];
        let report = extract_all(lines);
        assert_eq!(report.malformed_lines, 1);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].field(EVENT_NAME), "ok");
    }

    #[test]
    fn non_string_scalars_are_stringified() {
        let line = r#"methodData:{"name":"view","params":{"userId":12345,"tela":null}}"#;
        match extract_line(line) {
            LineOutcome::Event(event) => {
                assert_eq!(event.field("USER_ID"), "12345");
                assert_eq!(event.field(SCREEN), "");
            }
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn channel_feed_extracts_and_groups_incrementally() {
        let (tx, rx) = mpsc::channel(8);
        let producer = tokio::spawn(async move {
            let lines = [
                r#"methodData:{"name":"a","params":{"funcionalidade":"Checkout"}}"#,
                "noise line",
                r#"methodData:{"name":"b","params":{}}"#,
            ];
            for line in lines {
                tx.send(line.to_string()).await.unwrap();
            }
        });

        let mut groups = FeatureGroups::default();
        let report = extract_from_channel(rx, &mut groups).await;
        producer.await.unwrap();

        assert_eq!(report.events.len(), 2);
        assert_eq!(report.malformed_lines, 0);
        let names: Vec<&str> = groups.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Checkout", "no_feature"]);
    }
}
