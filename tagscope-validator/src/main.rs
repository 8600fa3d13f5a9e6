//! tagscope-validator - Tagging event validation CLI
//!
//! Loads an expected-events spreadsheet and an observed-events source
//! (raw device log text or a CSV export), reconciles the two, and writes
//! validation reports plus optional grouped-log exports. The narrative
//! analysis collaborator is optional; when it is not configured or fails,
//! reports carry a marked placeholder instead.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagscope_common::config;
use tagscope_common::schema::{FEATURE, SUB_FEATURE};
use tagscope_validator::analyzer::{narrative_or_placeholder, FlowClient, Summarize};
use tagscope_validator::report::{report_directory, ReportGenerator};
use tagscope_validator::{
    aggregate, capped_summary, export, extract_all, load_events, load_events_from_path, normalize,
    reconcile, FeatureGroups,
};

/// How to interpret the observed-events file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ObservedFormat {
    /// Detect from content: payload markers mean raw log text
    Auto,
    /// Raw device log text
    Log,
    /// CSV export in the fixed schema
    Csv,
}

/// Command-line arguments for tagscope-validator
#[derive(Parser, Debug)]
#[command(name = "tagscope-validator")]
#[command(about = "Validates tagging events observed on a device against an expected-event sheet")]
#[command(version)]
struct Args {
    /// Expected-events spreadsheet (CSV export)
    #[arg(long, value_name = "FILE")]
    expected: PathBuf,

    /// Observed events: raw device log text or a CSV export
    #[arg(long, value_name = "FILE")]
    observed: PathBuf,

    /// Format of the observed file
    #[arg(long, value_enum, default_value = "auto")]
    observed_format: ObservedFormat,

    /// Base directory for reports and exports
    #[arg(short, long, env = "TAGSCOPE_OUTPUT_DIR")]
    out: Option<PathBuf>,

    /// Configuration file (default: <config dir>/tagscope/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip the narrative analysis collaborator
    #[arg(long)]
    no_narrative: bool,

    /// Also export captured log events grouped by feature
    #[arg(long)]
    export_groups: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagscope_validator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("Starting tagscope-validator {}", env!("CARGO_PKG_VERSION"));

    let toml_config = config::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    // Expected side: always tabular
    let expected = load_events_from_path(&args.expected)
        .with_context(|| format!("Failed to load expected events from {}", args.expected.display()))?;
    info!(count = expected.len(), "Expected events loaded");

    // Observed side: raw log text or a CSV export. Encoding noise in log
    // captures is tolerated, not fatal.
    let observed_bytes = std::fs::read(&args.observed)
        .with_context(|| format!("Failed to read observed events from {}", args.observed.display()))?;
    let observed_text = String::from_utf8_lossy(&observed_bytes);

    let mut groups = FeatureGroups::new();
    let observed = match resolve_format(args.observed_format, &observed_text) {
        ObservedFormat::Log => {
            let report = extract_all(observed_text.lines());
            if report.malformed_lines > 0 {
                warn!(
                    malformed = report.malformed_lines,
                    "Some log lines carried unparseable event payloads"
                );
            }
            for event in &report.events {
                groups.push(event.clone());
            }
            info!(count = report.events.len(), "Events extracted from log text");
            report.events
        }
        _ => {
            let events = load_events(observed_text.as_bytes())
                .context("Failed to load observed events as CSV")?;
            info!(count = events.len(), "Observed events loaded from CSV");
            events
        }
    };

    // Reconcile and aggregate
    let partition = reconcile(&expected, &observed).context("Reconciliation failed")?;
    let summary = aggregate(&partition);
    info!("Validation result: {}", summary.display_string());

    // Narrative analysis (optional collaborator)
    let narrative = if args.no_narrative {
        "[narrative analysis skipped]".to_string()
    } else {
        let client = config::resolve_flow_credentials(&toml_config)
            .map(FlowClient::new)
            .transpose()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Narrative client could not be created");
                None
            });
        let excerpt = capped_summary(&partition);
        narrative_or_placeholder(client.as_ref().map(|c| c as &dyn Summarize), &excerpt).await
    };

    // Reports go under a feature-named directory, taken from the first
    // expected record.
    let base_dir = args
        .out
        .or(toml_config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let (feature, sub_feature) = match expected.first() {
        Some(first) => {
            let normalized = normalize(first);
            (
                normalized.field(FEATURE).to_string(),
                Some(normalized.field(SUB_FEATURE).to_string()),
            )
        }
        None => (String::new(), None),
    };
    let report_dir = report_directory(&base_dir, &feature, sub_feature.as_deref());

    let generator = ReportGenerator::new(report_dir.clone());
    let artifacts = generator
        .write_all(&partition, &summary, &narrative)
        .context("Failed to write reports")?;
    info!(report = %artifacts.text_report.display(), "Validation report ready");

    if args.export_groups && !groups.is_empty() {
        let export_dir = base_dir.join("captured-logs");
        let written = export::export_groups(&groups, &export_dir)
            .context("Failed to export grouped logs")?;
        info!(files = written.len(), dir = %export_dir.display(), "Grouped logs exported");
    }

    Ok(())
}

/// Resolve `Auto` by content: any payload marker means raw log text.
fn resolve_format(requested: ObservedFormat, text: &str) -> ObservedFormat {
    match requested {
        ObservedFormat::Auto => {
            if text.contains("methodData:") {
                ObservedFormat::Log
            } else {
                ObservedFormat::Csv
            }
        }
        other => other,
    }
}
