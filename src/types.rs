use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::collections::HashMap;
use std::fmt;

/// One value at the intersection of a record and a header.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// The record has no entry for the header.
    #[default]
    Absent,
    /// The field was present but held no text.
    Empty,
    Number(f64),
    Text(String),
}

static ABSENT: Cell = Cell::Absent;

impl Cell {
    /// Absent and empty cells both count as missing. A zero-length `Text`
    /// is treated the same way so hand-built tables behave like decoded ones.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Absent | Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Text rendering used for category labels and previews.
    pub fn display_value(&self) -> Option<String> {
        match self {
            Cell::Absent | Cell::Empty => None,
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Text(s) if s.is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

/// Renders integral values without a fractional part ("30" rather than "30.0").
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A decoded row keyed by header name. Missing keys are absent cells.
pub type Record = HashMap<String, Cell>;

/// Looks up a header in a record, treating a missing key as `Cell::Absent`.
pub fn cell<'a>(record: &'a Record, header: &str) -> &'a Cell {
    record.get(header).unwrap_or(&ABSENT)
}

/// Ordered headers plus ordered records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Table { headers, records }
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Every cell of one column, in record order.
    pub fn column<'a>(&'a self, header: &'a str) -> impl Iterator<Item = &'a Cell> + 'a {
        self.records.iter().map(move |record| cell(record, header))
    }
}

/// Column classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Numeric,
    #[default]
    Categorical,
    /// Reserved for columns with no evidence at all; the profiler reports
    /// such columns as `Categorical`.
    Unknown,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Numeric => "numeric",
            DataType::Categorical => "categorical",
            DataType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Statistics only produced for numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

/// A category label and how many records carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Per-column slice of a dataset profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub data_type: DataType,
    pub unique_values: usize,
    pub missing_values: usize,
    #[serde(flatten)]
    pub numeric: Option<NumericStats>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_values: Vec<ValueCount>,
}

impl ColumnSummary {
    pub fn min(&self) -> Option<f64> {
        self.numeric.map(|s| s.min)
    }

    pub fn max(&self) -> Option<f64> {
        self.numeric.map(|s| s.max)
    }

    pub fn mean(&self) -> Option<f64> {
        self.numeric.map(|s| s.mean)
    }

    pub fn median(&self) -> Option<f64> {
        self.numeric.map(|s| s.median)
    }

    /// Fraction of rows missing in this column, 0 for an empty table.
    pub fn missing_ratio(&self, total_rows: usize) -> f64 {
        if total_rows == 0 {
            0.0
        } else {
            self.missing_values as f64 / total_rows as f64
        }
    }
}

/// Dataset-level profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub column_summaries: IndexMap<String, ColumnSummary>,
    pub missing_value_columns: Vec<String>,
}

impl DatasetSummary {
    pub fn column(&self, header: &str) -> Option<&ColumnSummary> {
        self.column_summaries.get(header)
    }

    /// Columns of one type, in header order.
    pub fn columns_of_type(
        &self,
        data_type: DataType,
    ) -> impl Iterator<Item = (&String, &ColumnSummary)> {
        self.column_summaries
            .iter()
            .filter(move |(_, summary)| summary.data_type == data_type)
    }
}

/// Decode failure codes reported in the JSON error response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum DecodeErrorType {
    Process = 0,   // Unhandled failure
    Database = 1,  // History store error
    Sample = 2,    // Empty file or no header line
    Binary = 3,    // File is binary
    TooLarge = 4,  // Exceeds the configured byte limit
    Malformed = 5, // Tokenizer rejected the content
    Encoding = 6,  // Could not transcode to UTF-8
}

impl fmt::Display for DecodeErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl DecodeErrorType {
    pub fn message(&self) -> &'static str {
        match self {
            DecodeErrorType::Process => "Unhandled exception",
            DecodeErrorType::Database => "Dataset history error",
            DecodeErrorType::Sample => "Could not read any data. Is the file empty?",
            DecodeErrorType::Binary => "File is binary file",
            DecodeErrorType::TooLarge => "File is too large to profile",
            DecodeErrorType::Malformed => "File could not be parsed as CSV",
            DecodeErrorType::Encoding => "File encoding is not supported",
        }
    }
}

/// Constants
pub mod constants {
    pub const DEFAULT_SCAN_LINES: usize = 1000;
    pub const DEFAULT_PREVIEW_ROWS: usize = 10;
    pub const DEFAULT_TOP_VALUES: usize = 5;
    pub const MAX_FILE_BYTES: u64 = 100 * 1024 * 1024; // 100MB
    pub const BINARY_PROBE_BYTES: usize = 1024;
    pub const BINARY_UNPRINTABLE_PERCENT: usize = 20;
    pub const FIELD_DELIM_PERCENT: usize = 50;
    pub const TEXT_SEP_PERCENT: usize = 50;
    pub const CSVA_GUESS_SIZE: usize = 5120; // 5KB threshold for quick charset guess

    /// Candidate field delimiters in priority order
    pub const FIELD_DELIMS: [char; 4] = [',', ';', '\t', '|'];

    /// Text separator candidates
    pub const TEXT_SEPS: [char; 2] = ['"', '\''];

    /// Quote used when detection finds nothing better
    pub const DEFAULT_QUOTE: char = '"';

    /// Label used for missing cells in category breakdowns
    pub const MISSING_LABEL: &str = "N/A";

    pub const DEFAULT_DB_PORT: u16 = 5432;
}
