pub mod categorical;
pub mod inference;
pub mod numeric;

pub use categorical::{category_breakdown, count_unique, count_unique_numbers};
pub use inference::{coerce, infer_column_type};
pub use numeric::{median, numeric_stats};

use crate::types::constants::DEFAULT_TOP_VALUES;
use crate::types::{cell, Cell, ColumnSummary, DataType, DatasetSummary, Record, Table};
use indexmap::IndexMap;
use tracing::debug;

/// Knobs for a profiling run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOptions {
    /// Count numeric-looking text equal to the matching number when counting
    /// categorical unique values.
    pub unify_numeric_text: bool,
    /// Size of the per-column category breakdown, 0 to skip it.
    pub top_values: usize,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        ProfileOptions {
            unify_numeric_text: false,
            top_values: DEFAULT_TOP_VALUES,
        }
    }
}

/// Profile a table with default options.
pub fn profile(headers: &[String], records: &[Record]) -> DatasetSummary {
    profile_with(headers, records, &ProfileOptions::default())
}

pub fn profile_table(table: &Table, options: &ProfileOptions) -> DatasetSummary {
    profile_with(&table.headers, &table.records, options)
}

/// Profile every header against every record.
///
/// A record that lacks a header contributes an absent cell. Columns are
/// summarized independently and in header order. Never fails and shares no
/// state between calls.
pub fn profile_with(
    headers: &[String],
    records: &[Record],
    options: &ProfileOptions,
) -> DatasetSummary {
    let mut column_summaries = IndexMap::with_capacity(headers.len());
    let mut missing_value_columns = Vec::new();

    for header in headers {
        let cells: Vec<&Cell> = records.iter().map(|record| cell(record, header)).collect();
        let summary = summarize_column(&cells, options);

        if summary.missing_values > 0 {
            missing_value_columns.push(header.clone());
        }
        column_summaries.insert(header.clone(), summary);
    }

    debug!(
        rows = records.len(),
        columns = headers.len(),
        with_missing = missing_value_columns.len(),
        "profiled dataset"
    );

    DatasetSummary {
        total_rows: records.len(),
        total_columns: headers.len(),
        column_summaries,
        missing_value_columns,
    }
}

/// Summarize one column given all of its cells, missing ones included.
pub fn summarize_column(cells: &[&Cell], options: &ProfileOptions) -> ColumnSummary {
    let missing_values = cells.iter().filter(|c| c.is_missing()).count();
    let present: Vec<&Cell> = cells.iter().copied().filter(|c| !c.is_missing()).collect();

    match infer_column_type(present.iter().copied()) {
        DataType::Numeric => {
            let values: Vec<f64> = present.iter().filter_map(|c| coerce(c)).collect();
            ColumnSummary {
                data_type: DataType::Numeric,
                unique_values: count_unique_numbers(&values),
                missing_values,
                numeric: numeric_stats(&values),
                top_values: Vec::new(),
            }
        }
        _ => ColumnSummary {
            data_type: DataType::Categorical,
            unique_values: count_unique(present.iter().copied(), options.unify_numeric_text),
            missing_values,
            numeric: None,
            top_values: category_breakdown(cells.iter().copied(), options.top_values),
        },
    }
}
