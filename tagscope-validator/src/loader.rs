//! Tabular event loader
//!
//! Reads a delimited spreadsheet export and yields `EventRecord`s. The
//! header row is located by content, not position: the first row whose
//! column-name set is a superset of the fixed schema. Anything before it
//! is preamble and is discarded. Ids are assigned 1-based in data-row
//! order; this is the identity used for tier-1 matching.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tagscope_common::{schema, Error, EventRecord, Result};
use tracing::debug;

/// Load expected events from delimited tabular text.
///
/// Fails with [`Error::SchemaNotFound`] when no row anywhere in the input
/// carries all schema columns. Columns outside the schema are ignored;
/// schema columns absent from a given row become empty strings.
pub fn load_events<R: Read>(reader: R) -> Result<Vec<EventRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut header: Option<Vec<String>> = None;
    let mut preamble_rows = 0usize;
    let mut events = Vec::new();
    let mut next_id: u32 = 1;

    for row in csv_reader.records() {
        let row = row?;
        match &header {
            None => {
                let columns: Vec<String> = row.iter().map(str::to_string).collect();
                if schema::contains_full_schema(&columns) {
                    debug!(preamble_rows, "Header row located");
                    header = Some(columns);
                } else {
                    preamble_rows += 1;
                }
            }
            Some(columns) => {
                let mut fields = HashMap::new();
                for (idx, name) in columns.iter().enumerate() {
                    if let Some(value) = row.get(idx) {
                        fields.insert(name.clone(), value.to_string());
                    }
                }
                events.push(EventRecord::new(Some(next_id), fields));
                next_id += 1;
            }
        }
    }

    if header.is_none() {
        return Err(Error::SchemaNotFound);
    }
    Ok(events)
}

/// Load expected events from a CSV file on disk.
pub fn load_events_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<EventRecord>> {
    let file = std::fs::File::open(path.as_ref())?;
    load_events(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagscope_common::schema::{FIELD_SCHEMA, SCREEN};

    fn header_line() -> String {
        FIELD_SCHEMA.join(",")
    }

    fn data_line(screen: &str) -> String {
        // EVENT NAME ... SCREEN is the 7th column
        format!("evt,prod-env,app,Checkout,,nav,{},click,button,,,,,,,,,", screen)
    }

    #[test]
    fn loads_rows_after_header_with_sequential_ids() {
        let input = format!("{}\n{}\n{}\n", header_line(), data_line("Home"), data_line("Cart"));
        let events = load_events(input.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, Some(1));
        assert_eq!(events[1].id, Some(2));
        assert_eq!(events[0].field(SCREEN), "Home");
        assert_eq!(events[1].field(SCREEN), "Cart");
    }

    #[test]
    fn header_detection_is_position_independent() {
        let no_preamble = format!("{}\n{}\n", header_line(), data_line("Home"));
        let with_preamble = format!(
            "exported by,someone\n,,,\nnotes,free text here\n{}\n{}\n",
            header_line(),
            data_line("Home")
        );
        let a = load_events(no_preamble.as_bytes()).unwrap();
        let b = load_events(with_preamble.as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn header_may_have_extra_columns_in_any_order() {
        let mut columns: Vec<&str> = FIELD_SCHEMA.iter().rev().copied().collect();
        columns.push("INTERNAL NOTES");
        let header = columns.join(",");
        // SCREEN is the 12th column in the reversed header
        let mut values = vec![""; columns.len()];
        values[11] = "Home";
        let input = format!("{}\n{}\n", header, values.join(","));

        let events = load_events(input.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field(SCREEN), "Home");
        assert_eq!(events[0].field("INTERNAL NOTES"), "");
    }

    #[test]
    fn short_rows_fill_missing_schema_columns_with_empty() {
        let input = format!("{}\nevt,prod-env\n", header_line());
        let events = load_events(input.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field("EVENT NAME"), "evt");
        assert_eq!(events[0].field(SCREEN), "");
    }

    #[test]
    fn missing_header_is_schema_not_found() {
        let input = "a,b,c\n1,2,3\n";
        match load_events(input.as_bytes()) {
            Err(Error::SchemaNotFound) => {}
            other => panic!("expected SchemaNotFound, got {:?}", other),
        }
    }

    #[test]
    fn empty_input_is_schema_not_found() {
        match load_events("".as_bytes()) {
            Err(Error::SchemaNotFound) => {}
            other => panic!("expected SchemaNotFound, got {:?}", other),
        }
    }
}
