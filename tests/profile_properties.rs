//! Property-based tests for the column profiler.
//!
//! These check that profiling stays consistent for arbitrary tables:
//! 1. **Determinism**: the same table always yields the same summary
//! 2. **Shape**: row and column counts match the input, in header order
//! 3. **Missingness**: per-column counts agree with `missingValueColumns`
//! 4. **Inference**: a column is numeric exactly when all its present cells coerce
//!
//! ```bash
//! PROPTEST_CASES=10000 cargo test --test profile_properties
//! ```

use proptest::prelude::*;

use csvprofiler::profile::coerce;
use csvprofiler::types::cell;
use csvprofiler::{profile, profile_with, Cell, DataType, ProfileOptions, Record};

// =============================================================================
// Test Strategies
// =============================================================================

/// Cells of every variant, including numeric-looking text
fn any_cell() -> BoxedStrategy<Cell> {
    prop_oneof![
        Just(Cell::Absent),
        Just(Cell::Empty),
        (-1.0e6f64..1.0e6).prop_map(Cell::Number),
        "[a-z]{1,4}".prop_map(Cell::Text),
        "-?[0-9]{1,4}(\\.[0-9]{1,2})?".prop_map(Cell::Text),
    ]
    .boxed()
}

/// Cells that never block numeric inference
fn numeric_cell() -> BoxedStrategy<Cell> {
    prop_oneof![
        Just(Cell::Empty),
        (-1.0e6f64..1.0e6).prop_map(Cell::Number),
        "[0-9]{1,4}".prop_map(Cell::Text),
    ]
    .boxed()
}

/// Distinct headers plus records built from the given cell strategy
fn table_of(cells: BoxedStrategy<Cell>) -> impl Strategy<Value = (Vec<String>, Vec<Record>)> {
    (1usize..5, 0usize..20).prop_flat_map(move |(columns, rows)| {
        let headers: Vec<String> = (0..columns).map(|i| format!("col{}", i)).collect();
        let row = prop::collection::vec(cells.clone(), columns);
        prop::collection::vec(row, rows).prop_map(move |rows| {
            let records = rows
                .into_iter()
                .map(|row| {
                    headers
                        .iter()
                        .cloned()
                        .zip(row)
                        .filter(|(_, cell)| *cell != Cell::Absent)
                        .collect::<Record>()
                })
                .collect();
            (headers.clone(), records)
        })
    })
}

fn column<'a>(records: &'a [Record], header: &'a str) -> Vec<&'a Cell> {
    records.iter().map(|r| cell(r, header)).collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn profile_is_deterministic((headers, records) in table_of(any_cell())) {
        prop_assert_eq!(profile(&headers, &records), profile(&headers, &records));
    }

    #[test]
    fn shape_matches_input((headers, records) in table_of(any_cell())) {
        let summary = profile(&headers, &records);
        prop_assert_eq!(summary.total_rows, records.len());
        prop_assert_eq!(summary.total_columns, headers.len());
        let keys: Vec<&String> = summary.column_summaries.keys().collect();
        let expected: Vec<&String> = headers.iter().collect();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn missing_counts_are_consistent((headers, records) in table_of(any_cell())) {
        let summary = profile(&headers, &records);
        for header in &headers {
            let column_summary = summary.column(header).unwrap();
            let expected = column(&records, header).iter().filter(|c| c.is_missing()).count();
            prop_assert_eq!(column_summary.missing_values, expected);
            prop_assert!(column_summary.missing_values <= summary.total_rows);
            prop_assert!(
                column_summary.unique_values <= summary.total_rows - column_summary.missing_values
            );
            prop_assert_eq!(
                summary.missing_value_columns.contains(header),
                column_summary.missing_values > 0
            );
        }
        let flagged: Vec<&String> = headers
            .iter()
            .filter(|h| summary.missing_value_columns.contains(h))
            .collect();
        let listed: Vec<&String> = summary.missing_value_columns.iter().collect();
        prop_assert_eq!(flagged, listed);
    }

    #[test]
    fn numeric_inference_is_all_or_nothing((headers, records) in table_of(any_cell())) {
        let summary = profile(&headers, &records);
        for header in &headers {
            let cells = column(&records, header);
            let present: Vec<&&Cell> = cells.iter().filter(|c| !c.is_missing()).collect();
            let expect_numeric =
                !present.is_empty() && present.iter().all(|c| coerce(c).is_some());
            let column_summary = summary.column(header).unwrap();
            prop_assert_eq!(column_summary.data_type == DataType::Numeric, expect_numeric);
            prop_assert_eq!(column_summary.numeric.is_some(), expect_numeric);
        }
    }

    #[test]
    fn numeric_stats_are_ordered((headers, records) in table_of(numeric_cell())) {
        let summary = profile(&headers, &records);
        for header in &headers {
            let column_summary = summary.column(header).unwrap();
            if let Some(stats) = column_summary.numeric {
                prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
                let tolerance = 1e-6 * stats.max.abs().max(stats.min.abs()).max(1.0);
                prop_assert!(stats.min - tolerance <= stats.mean);
                prop_assert!(stats.mean <= stats.max + tolerance);
            } else {
                prop_assert_eq!(column_summary.data_type, DataType::Categorical);
                prop_assert_eq!(column_summary.missing_values, records.len());
            }
        }
    }

    #[test]
    fn unify_option_never_increases_unique_counts((headers, records) in table_of(any_cell())) {
        let options = ProfileOptions { unify_numeric_text: true, ..ProfileOptions::default() };
        let plain = profile(&headers, &records);
        let unified = profile_with(&headers, &records, &options);
        for header in &headers {
            prop_assert!(
                unified.column(header).unwrap().unique_values
                    <= plain.column(header).unwrap().unique_values
            );
        }
    }
}
