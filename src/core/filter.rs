use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::events::{Column, OutputRow};
use crate::error::FilterParseError;

/// Label shown for the "no constraint" choice
pub const ALL_LABEL: &str = "All";

/// What a single filter selector is set to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    All,
    Value(String),
}

impl Selection {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Value(wanted) => wanted == value,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL_LABEL),
            Selection::Value(value) => f.write_str(value),
        }
    }
}

/// The current setting of every filter selector.
///
/// Columns that were never set read as [`Selection::All`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    selections: BTreeMap<Column, Selection>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: Column) -> &Selection {
        static ALL: Selection = Selection::All;
        self.selections.get(&column).unwrap_or(&ALL)
    }

    /// Non-filterable columns are ignored.
    pub fn set(&mut self, column: Column, selection: Selection) {
        if !column.is_filterable() {
            tracing::debug!("Ignoring selection on non-filterable column {}", column);
            return;
        }
        match selection {
            Selection::All => {
                self.selections.remove(&column);
            }
            value => {
                self.selections.insert(column, value);
            }
        }
    }

    pub fn with(mut self, column: Column, value: impl Into<String>) -> Self {
        self.set(column, Selection::Value(value.into()));
        self
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    pub fn is_unconstrained(&self) -> bool {
        self.selections.is_empty()
    }

    /// Active constraints, in column order
    pub fn constraints(&self) -> impl Iterator<Item = (Column, &str)> {
        self.selections.iter().filter_map(|(column, selection)| match selection {
            Selection::Value(value) => Some((*column, value.as_str())),
            Selection::All => None,
        })
    }

    pub fn matches(&self, row: &OutputRow) -> bool {
        self.selections
            .iter()
            .all(|(column, selection)| selection.matches(row.get(*column)))
    }

    /// Rows satisfying every constraint, in their original order.
    pub fn apply<'a>(&self, rows: &'a [OutputRow]) -> Vec<&'a OutputRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }

    /// Build a selection from `COLUMN=VALUE` expressions.
    pub fn from_exprs<I, S>(exprs: I) -> Result<Self, FilterParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::new();
        for expr in exprs {
            let FilterExpr { column, selection: value } = expr.as_ref().parse()?;
            selection.set(column, value);
        }
        Ok(selection)
    }
}

/// One parsed `COLUMN=VALUE` filter argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpr {
    pub column: Column,
    pub selection: Selection,
}

impl FromStr for FilterExpr {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| FilterParseError::MissingSeparator(s.to_string()))?;

        let column = Column::from_header(name)
            .filter(|column| column.is_filterable())
            .ok_or_else(|| {
                let expected = Column::FILTERABLE
                    .iter()
                    .map(|c| c.header())
                    .collect::<Vec<_>>()
                    .join(", ");
                FilterParseError::UnknownColumn(name.trim().to_string(), expected)
            })?;

        let selection = if value == ALL_LABEL {
            Selection::All
        } else {
            Selection::Value(value.to_string())
        };

        Ok(Self { column, selection })
    }
}

/// The options offered by one filter selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceList {
    pub column: Column,
    /// Distinct non-empty values, sorted
    pub values: Vec<String>,
}

impl ChoiceList {
    pub fn from_rows(column: Column, rows: &[OutputRow]) -> Self {
        let values: BTreeSet<&str> = rows
            .iter()
            .map(|row| row.get(column))
            .filter(|value| !value.is_empty())
            .collect();

        Self {
            column,
            values: values.into_iter().map(str::to_string).collect(),
        }
    }

    /// Choice lists for every filterable column
    pub fn for_rows(rows: &[OutputRow]) -> Vec<ChoiceList> {
        Column::FILTERABLE
            .iter()
            .map(|column| Self::from_rows(*column, rows))
            .collect()
    }

    /// Number of options including "All"
    pub fn option_count(&self) -> usize {
        self.values.len() + 1
    }

    /// Option at `index`, where 0 is "All"
    pub fn option(&self, index: usize) -> Option<Selection> {
        match index {
            0 => Some(Selection::All),
            i => self.values.get(i - 1).cloned().map(Selection::Value),
        }
    }

    pub fn position(&self, selection: &Selection) -> Option<usize> {
        match selection {
            Selection::All => Some(0),
            Selection::Value(value) => self.values.iter().position(|v| v == value).map(|i| i + 1),
        }
    }

    /// The option after (or before) `current`, wrapping around.
    pub fn step(&self, current: &Selection, forward: bool) -> Selection {
        let len = self.option_count();
        let index = self.position(current).unwrap_or(0);
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        self.option(next).unwrap_or_default()
    }
}
