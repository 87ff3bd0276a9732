//! Core functionality module
//!
//! Contains event reconstruction, row filtering and the application state

pub mod events;
pub mod reconstruct;
pub mod filter;
pub mod state;

// Re-export main types
pub use events::{Column, FieldSource, EventRole, RawEvent, ActiveContext, OutputRow, value_to_text};
pub use reconstruct::{load_rows, rows_from_str, reconstruct};
pub use filter::{FilterSelection, FilterExpr, Selection, ChoiceList, ALL_LABEL};
pub use state::{AppState, ApplyOutcome, LoadSummary, LoadedSource};
