//! Rebuilding table rows from a controller event log
//!
//! The log is an ordered JSON array. Clock-in and clock-out events switch the
//! active employee; every other event becomes one row stamped with whoever
//! was clocked in at that point.

use std::fs;
use std::path::Path;
use serde_json::Value;

use super::events::{ActiveContext, EventRole, OutputRow, RawEvent};
use crate::config::SchemaConfig;
use crate::error::LoadError;

/// Read and reconstruct an event log file.
pub fn load_rows<P: AsRef<Path>>(path: P, schema: &SchemaConfig) -> Result<Vec<OutputRow>, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    rows_from_str(&text, schema)
}

/// Parse JSON text and reconstruct its rows.
pub fn rows_from_str(text: &str, schema: &SchemaConfig) -> Result<Vec<OutputRow>, LoadError> {
    let document: Value = serde_json::from_str(text)?;
    reconstruct(&document, schema)
}

/// Scan a parsed log once, left to right, emitting a row per data event.
pub fn reconstruct(document: &Value, schema: &SchemaConfig) -> Result<Vec<OutputRow>, LoadError> {
    let events = document.as_array().ok_or(LoadError::NotAnArray {
        found: json_kind(document),
    })?;

    let mut rows = Vec::with_capacity(events.len());
    let mut context: Option<ActiveContext> = None;

    for (index, entry) in events.iter().enumerate() {
        let fields = entry.as_object().ok_or(LoadError::NotAnObject {
            index,
            found: json_kind(entry),
        })?;
        let event = RawEvent::new(fields);

        match event.role(schema) {
            EventRole::ContextStart => {
                let next = ActiveContext::from_event(&event);
                if let Some(previous) = &context {
                    tracing::debug!(
                        "Event #{}: {} clocked in while {} still active",
                        index,
                        next.name,
                        previous.name
                    );
                }
                context = Some(next);
            }
            EventRole::ContextEnd => {
                context = None;
            }
            EventRole::Data => {
                rows.push(OutputRow::from_event(&event, context.as_ref()));
            }
        }
    }

    tracing::debug!("Reconstructed {} rows from {} events", rows.len(), events.len());
    Ok(rows)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::Column;
    use serde_json::json;

    fn rows(value: Value) -> Vec<OutputRow> {
        reconstruct(&value, &SchemaConfig::default()).unwrap()
    }

    #[test]
    fn test_clock_in_out_example() {
        let rows = rows(json!([
            {"sts": "IN", "name": "Alice", "sftno": "1"},
            {"stn": "5", "uid": "U1", "dt": "2024-01-01", "t": "08:00"},
            {"sts": "OUT"},
            {"stn": "6", "uid": "U2"}
        ]));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(Column::StationNo), "5");
        assert_eq!(rows[0].get(Column::UserId), "U1");
        assert_eq!(rows[0].get(Column::UserName), "Alice");
        assert_eq!(rows[0].get(Column::ShiftNo), "1");
        assert_eq!(rows[0].get(Column::Date), "2024-01-01");
        assert_eq!(rows[0].get(Column::Time), "08:00");
        assert_eq!(rows[0].get(Column::Job), "");

        assert_eq!(rows[1].get(Column::StationNo), "6");
        assert_eq!(rows[1].get(Column::UserId), "U2");
        assert_eq!(rows[1].get(Column::UserName), "");
        assert_eq!(rows[1].get(Column::ShiftNo), "");
    }

    #[test]
    fn test_row_count_excludes_markers() {
        let rows = rows(json!([
            {"stn": 1},
            {"sts": "IN", "name": "Bo"},
            {"stn": 2},
            {"sts": "IN", "name": "Cy"},
            {"sts": "BREAK", "stn": 3},
            {"sts": "OUT"},
            {"sts": "OUT"},
            {}
        ]));

        assert_eq!(rows.len(), 4);
        let names: Vec<&str> = rows.iter().map(|r| r.get(Column::UserName)).collect();
        assert_eq!(names, vec!["", "Bo", "Cy", ""]);
    }

    #[test]
    fn test_clock_in_drops_other_fields() {
        let rows = rows(json!([
            {"sts": "IN", "name": "Alice", "sftno": 2, "stn": "99", "uid": "ADMIN"},
            {"stn": "5"}
        ]));

        assert_eq!(rows[0].get(Column::StationNo), "5");
        assert_eq!(rows[0].get(Column::UserId), "");
        assert_eq!(rows[0].get(Column::ShiftNo), "2");
    }

    #[test]
    fn test_second_clock_in_replaces_context() {
        let rows = rows(json!([
            {"sts": "IN", "name": "Alice", "sftno": "1"},
            {"sts": "IN", "name": "Bob"},
            {"stn": "5"}
        ]));

        assert_eq!(rows[0].get(Column::UserName), "Bob");
        assert_eq!(rows[0].get(Column::ShiftNo), "");
    }

    #[test]
    fn test_values_are_stringified() {
        let rows = rows(json!([
            {"stn": 5, "angle": 12.5, "job": null, "force": true, "cycle": "3"}
        ]));

        assert_eq!(rows[0].get(Column::StationNo), "5");
        assert_eq!(rows[0].get(Column::Angle), "12.5");
        assert_eq!(rows[0].get(Column::Job), "");
        assert_eq!(rows[0].get(Column::Force), "true");
        assert_eq!(rows[0].get(Column::Cycle), "3");
    }

    #[test]
    fn test_custom_markers() {
        let schema = SchemaConfig {
            role_field: "kind".to_string(),
            context_start: "LOGIN".to_string(),
            context_end: "LOGOUT".to_string(),
        };
        let rows = reconstruct(
            &json!([
                {"kind": "LOGIN", "name": "Alice"},
                {"sts": "IN", "name": "Ignored", "stn": "1"},
                {"kind": "LOGOUT"}
            ]),
            &schema,
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(Column::UserName), "Alice");
    }

    #[test]
    fn test_rejects_non_array_document() {
        let err = reconstruct(&json!({"sts": "IN"}), &SchemaConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::NotAnArray { found: "an object" }));
    }

    #[test]
    fn test_rejects_non_object_event() {
        let err = reconstruct(&json!([{"stn": 1}, 42]), &SchemaConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::NotAnObject { index: 1, .. }));
        assert_eq!(err.to_string(), "event #1 is not a JSON object (found a number)");
    }

    #[test]
    fn test_malformed_json() {
        let err = rows_from_str("[{\"stn\": ", &SchemaConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_empty_array_yields_no_rows() {
        assert!(rows(json!([])).is_empty());
    }
}
