//! Fixed event field schema
//!
//! Every event record, regardless of source, carries exactly these 18
//! fields. The schema is the contract between the tabular loader, the log
//! extractor, and the reconciler; both ingestion paths map their
//! source-specific names onto it at construction time.

/// Canonical field names, in export/report order.
pub const FIELD_SCHEMA: [&str; 18] = [
    "EVENT NAME",
    "ENVIRONMENT",
    "PRODUCT",
    "FEATURE",
    "SUB_FEATURE",
    "CATEGORY",
    "SCREEN",
    "ACTION",
    "ELEMENT",
    "LABEL",
    "USER_ID",
    "USER_TYPE",
    "SELECTED_OPTION_1",
    "SELECTED_OPTION_2",
    "SELECTED_OPTION_3",
    "SELECTED_OPTION_4",
    "SELECTED_OPTION_5",
    "SELECTED_OPTION_6",
];

pub const EVENT_NAME: &str = "EVENT NAME";
pub const FEATURE: &str = "FEATURE";
pub const SUB_FEATURE: &str = "SUB_FEATURE";
pub const SCREEN: &str = "SCREEN";
pub const ACTION: &str = "ACTION";

/// Sentinel used when an empty field value is rendered in a report.
/// Comparison always uses the literal empty string, never the sentinel.
pub const NOT_SET: &str = "[not set]";

/// Screen-count bucket for expected records with no SCREEN value.
pub const UNSPECIFIED_SCREEN: &str = "[unspecified screen]";

/// Grouping bucket for extracted records with no FEATURE value.
pub const NO_FEATURE_BUCKET: &str = "no_feature";

/// True if `columns` contains every schema field name.
///
/// Used by the tabular loader for header detection: a header row is the
/// first row whose column set is a superset of the schema.
pub fn contains_full_schema<S: AsRef<str>>(columns: &[S]) -> bool {
    FIELD_SCHEMA
        .iter()
        .all(|field| columns.iter().any(|c| c.as_ref() == *field))
}
