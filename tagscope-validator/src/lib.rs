//! tagscope-validator library interface
//!
//! The validation pipeline: tabular loading, log extraction, grouping,
//! normalization, reconciliation, aggregation, and report generation.
//! The binary in `main.rs` is a thin orchestration layer over these
//! modules; everything here is usable as a library and covered by the
//! integration tests.

pub mod aggregate;
pub mod analyzer;
pub mod export;
pub mod extractor;
pub mod grouping;
pub mod loader;
pub mod normalize;
pub mod reconcile;
pub mod report;

pub use aggregate::{aggregate, capped_summary};
pub use extractor::{extract_all, extract_line, ExtractionReport, LineOutcome};
pub use grouping::FeatureGroups;
pub use loader::{load_events, load_events_from_path};
pub use normalize::normalize;
pub use reconcile::reconcile;
