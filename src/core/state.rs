//! Application state shared by the terminal and text front ends
//!
//! `AppState` owns the last successfully loaded row set and the filter
//! selectors built from it. Each user action maps to one command method.

use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};

use super::events::{Column, OutputRow};
use super::filter::{ChoiceList, FilterSelection, Selection};
use super::reconstruct::load_rows;
use crate::config::SchemaConfig;
use crate::error::LoadError;

/// The file behind the current row set
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub path: PathBuf,
    pub loaded_at: DateTime<Local>,
}

/// Result of a successful load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
}

/// Result of applying the current filter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The table now shows this many rows
    Matched(usize),
    /// Nothing matched; the table was left as it was
    NoMatch,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    schema: SchemaConfig,
    rows: Vec<OutputRow>,
    visible: Vec<usize>,
    choices: Vec<ChoiceList>,
    selection: FilterSelection,
    source: Option<LoadedSource>,
}

impl AppState {
    pub fn new(schema: SchemaConfig) -> Self {
        Self {
            schema,
            choices: ChoiceList::for_rows(&[]),
            ..Default::default()
        }
    }

    /// Load a log file, replacing the current rows only on success.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadSummary, LoadError> {
        let path = path.as_ref();
        tracing::info!("Loading event log {}", path.display());

        let rows = match load_rows(path, &self.schema) {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!("Failed to load {}: {}", path.display(), err);
                return Err(err);
            }
        };

        let summary = LoadSummary { rows: rows.len() };
        self.replace_rows(rows);
        self.source = Some(LoadedSource {
            path: path.to_path_buf(),
            loaded_at: Local::now(),
        });

        tracing::info!("Loaded {} rows from {}", summary.rows, path.display());
        Ok(summary)
    }

    fn replace_rows(&mut self, rows: Vec<OutputRow>) {
        self.choices = ChoiceList::for_rows(&rows);
        self.visible = (0..rows.len()).collect();
        self.rows = rows;
        self.selection.clear();
    }

    /// Show the rows matching the current selection.
    pub fn apply_filters(&mut self) -> ApplyOutcome {
        let matched: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.selection.matches(row))
            .map(|(i, _)| i)
            .collect();

        if matched.is_empty() {
            tracing::info!("No rows match {:?}", self.selection);
            return ApplyOutcome::NoMatch;
        }

        tracing::info!("Filter matched {} of {} rows", matched.len(), self.rows.len());
        self.visible = matched;
        ApplyOutcome::Matched(self.visible.len())
    }

    /// Move a selector to its next or previous choice.
    pub fn cycle_selection(&mut self, column: Column, forward: bool) -> Option<&Selection> {
        let next = self.choice_list(column)?.step(self.selection.get(column), forward);
        self.selection.set(column, next);
        Some(self.selection.get(column))
    }

    pub fn set_selection(&mut self, column: Column, selection: Selection) {
        self.selection.set(column, selection);
    }

    pub fn set_selections(&mut self, selection: FilterSelection) {
        self.selection = selection;
    }

    /// Put every selector back to "All" and show all rows.
    pub fn reset_filters(&mut self) {
        self.selection.clear();
        self.visible = (0..self.rows.len()).collect();
    }

    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &OutputRow> + '_ {
        self.visible.iter().map(|&i| &self.rows[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn total_len(&self) -> usize {
        self.rows.len()
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn choice_list(&self, column: Column) -> Option<&ChoiceList> {
        self.choices.iter().find(|choices| choices.column == column)
    }

    pub fn source(&self) -> Option<&LoadedSource> {
        self.source.as_ref()
    }
}
