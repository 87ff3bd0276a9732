//! Error types for loading event logs and parsing filter expressions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why an event log could not be turned into rows.
///
/// Any of these aborts the whole load; previously loaded rows are kept.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected a JSON array of events at the top level, found {found}")]
    NotAnArray { found: &'static str },

    #[error("event #{index} is not a JSON object (found {found})")]
    NotAnObject { index: usize, found: &'static str },
}

/// A `--filter COLUMN=VALUE` argument that could not be understood.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("filter '{0}' must have the form COLUMN=VALUE")]
    MissingSeparator(String),

    #[error("'{0}' is not a filterable column (expected one of: {1})")]
    UnknownColumn(String, String),
}
