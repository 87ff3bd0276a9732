use std::fmt;
use serde_json::{Map, Value};
use crate::config::SchemaConfig;

/// Key of the employee name on a clock-in event
pub const NAME_KEY: &str = "name";
/// Key of the shift number on a clock-in event
pub const SHIFT_KEY: &str = "sftno";

/// Columns of the reconstructed table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    StationNo,
    UserId,
    UserName,
    ShiftNo,
    Date,
    Time,
    ProgrammeNo,
    Cycle,
    Angle,
    WeldCurrent,
    SpotCount,
    Force,
    WeldCount,
    Job,
}

/// Where a column takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// A key on the data event itself
    Event(&'static str),
    /// A key captured from the active clock-in event
    Context(&'static str),
}

impl Column {
    pub const ALL: [Column; 14] = [
        Column::StationNo,
        Column::UserId,
        Column::UserName,
        Column::ShiftNo,
        Column::Date,
        Column::Time,
        Column::ProgrammeNo,
        Column::Cycle,
        Column::Angle,
        Column::WeldCurrent,
        Column::SpotCount,
        Column::Force,
        Column::WeldCount,
        Column::Job,
    ];

    /// Columns offered as filter selectors
    pub const FILTERABLE: [Column; 7] = [
        Column::StationNo,
        Column::UserId,
        Column::UserName,
        Column::ShiftNo,
        Column::Date,
        Column::Time,
        Column::ProgrammeNo,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::StationNo => "Station No",
            Column::UserId => "User ID",
            Column::UserName => "User Name",
            Column::ShiftNo => "Shift No",
            Column::Date => "Date",
            Column::Time => "Time",
            Column::ProgrammeNo => "Programme No",
            Column::Cycle => "Cycle",
            Column::Angle => "Angle",
            Column::WeldCurrent => "Weld Current",
            Column::SpotCount => "Spot Count",
            Column::Force => "Force",
            Column::WeldCount => "Weld Count",
            Column::Job => "Job",
        }
    }

    pub fn source(self) -> FieldSource {
        match self {
            Column::StationNo => FieldSource::Event("stn"),
            Column::UserId => FieldSource::Event("uid"),
            Column::UserName => FieldSource::Context(NAME_KEY),
            Column::ShiftNo => FieldSource::Context(SHIFT_KEY),
            Column::Date => FieldSource::Event("dt"),
            Column::Time => FieldSource::Event("t"),
            Column::ProgrammeNo => FieldSource::Event("pgmno"),
            Column::Cycle => FieldSource::Event("cycle"),
            Column::Angle => FieldSource::Event("angle"),
            Column::WeldCurrent => FieldSource::Event("wldcrt"),
            Column::SpotCount => FieldSource::Event("sptct"),
            Column::Force => FieldSource::Event("force"),
            Column::WeldCount => FieldSource::Event("wldct"),
            Column::Job => FieldSource::Event("job"),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_filterable(self) -> bool {
        Self::FILTERABLE.contains(&self)
    }

    /// Look up a column by its header text, ignoring ASCII case.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Self::ALL
            .into_iter()
            .find(|column| column.header().eq_ignore_ascii_case(header))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Role of a raw event within the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRole {
    ContextStart,
    ContextEnd,
    Data,
}

/// One untyped record from the controller log.
#[derive(Debug, Clone, Copy)]
pub struct RawEvent<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RawEvent<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Only a string role equal to a marker counts; anything else is data.
    pub fn role(&self, schema: &SchemaConfig) -> EventRole {
        match self.fields.get(&schema.role_field) {
            Some(Value::String(role)) if *role == schema.context_start => EventRole::ContextStart,
            Some(Value::String(role)) if *role == schema.context_end => EventRole::ContextEnd,
            _ => EventRole::Data,
        }
    }

    /// Field as display text, `""` when absent.
    pub fn text(&self, key: &str) -> String {
        self.fields.get(key).map(value_to_text).unwrap_or_default()
    }
}

/// Render a JSON value the way it appears in the table.
///
/// Strings lose their quotes, null becomes empty, numbers and booleans keep
/// their JSON spelling and containers are written as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Who is currently clocked in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveContext {
    pub name: String,
    pub shift_no: String,
}

impl ActiveContext {
    pub fn from_event(event: &RawEvent<'_>) -> Self {
        Self {
            name: event.text(NAME_KEY),
            shift_no: event.text(SHIFT_KEY),
        }
    }

    fn text(&self, key: &str) -> &str {
        match key {
            NAME_KEY => &self.name,
            SHIFT_KEY => &self.shift_no,
            _ => "",
        }
    }
}

/// A flattened data event with all 14 columns as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRow {
    values: [String; 14],
}

impl OutputRow {
    /// Build a row from a data event and whoever is clocked in.
    pub fn from_event(event: &RawEvent<'_>, context: Option<&ActiveContext>) -> Self {
        let values = Column::ALL.map(|column| match column.source() {
            FieldSource::Event(key) => event.text(key),
            FieldSource::Context(key) => context
                .map(|ctx| ctx.text(key).to_string())
                .unwrap_or_default(),
        });
        Self { values }
    }

    pub fn from_values(values: [String; 14]) -> Self {
        Self { values }
    }

    pub fn get(&self, column: Column) -> &str {
        &self.values[column.index()]
    }

    pub fn values(&self) -> &[String; 14] {
        &self.values
    }
}
