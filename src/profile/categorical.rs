use crate::detection::number::parse_number;
use crate::types::constants::MISSING_LABEL;
use crate::types::{Cell, ValueCount};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Hashable identity of a non-missing cell.
///
/// Numbers compare by value with `-0.0 == 0.0` and all NaNs equal; text
/// compares by exact content. A number and a text cell never share a key
/// unless text unification is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Number(u64),
    Text(&'a str),
}

fn number_key(n: f64) -> CellKey<'static> {
    let n = if n == 0.0 {
        0.0
    } else if n.is_nan() {
        f64::NAN
    } else {
        n
    };
    CellKey::Number(n.to_bits())
}

fn cell_key(cell: &Cell, unify_numeric_text: bool) -> Option<CellKey<'_>> {
    match cell {
        Cell::Absent | Cell::Empty => None,
        Cell::Text(s) if s.is_empty() => None,
        Cell::Number(n) => Some(number_key(*n)),
        Cell::Text(s) if unify_numeric_text => match parse_number(s) {
            Some(n) => Some(number_key(n)),
            None => Some(CellKey::Text(s)),
        },
        Cell::Text(s) => Some(CellKey::Text(s)),
    }
}

/// Count distinct non-missing values in a categorical column.
///
/// By default `Number(1.0)` and `Text("1")` are different values. With
/// `unify_numeric_text`, text that parses as a number is counted as that number.
pub fn count_unique<'a, I>(cells: I, unify_numeric_text: bool) -> usize
where
    I: IntoIterator<Item = &'a Cell>,
{
    cells
        .into_iter()
        .filter_map(|cell| cell_key(cell, unify_numeric_text))
        .collect::<HashSet<_>>()
        .len()
}

/// Count distinct values of an already-coerced numeric column.
pub fn count_unique_numbers(values: &[f64]) -> usize {
    values
        .iter()
        .map(|&n| number_key(n))
        .collect::<HashSet<_>>()
        .len()
}

/// Most frequent values of a column, missing cells counted as `"N/A"`.
///
/// Ordered by count descending; equal counts keep first-appearance order.
/// Labels are display text, so `Number(1)` and `Text("1")` share the label
/// `"1"` here even though `count_unique` keeps them apart by default.
pub fn category_breakdown<'a, I>(cells: I, limit: usize) -> Vec<ValueCount>
where
    I: IntoIterator<Item = &'a Cell>,
{
    if limit == 0 {
        return Vec::new();
    }

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for cell in cells {
        let label = cell
            .display_value()
            .unwrap_or_else(|| MISSING_LABEL.to_string());
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut breakdown: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    // Stable sort keeps first-appearance order among ties
    breakdown.sort_by(|a, b| b.count.cmp(&a.count));
    breakdown.truncate(limit);
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_unique_ignores_missing() {
        let cells = vec![text("a"), text("b"), text("a"), Cell::Empty, text("c")];
        assert_eq!(count_unique(&cells, false), 3);
    }

    #[test]
    fn test_number_and_text_are_distinct() {
        let cells = vec![Cell::Number(1.0), text("1"), text("x")];
        assert_eq!(count_unique(&cells, false), 3);
    }

    #[test]
    fn test_unified_number_and_text() {
        let cells = vec![Cell::Number(1.0), text("1"), text("1.0"), text("x")];
        assert_eq!(count_unique(&cells, true), 2);
    }

    #[test]
    fn test_text_compared_exactly() {
        let cells = vec![text("A"), text("a"), text("a ")];
        assert_eq!(count_unique(&cells, false), 3);
    }

    #[test]
    fn test_unique_numbers_zero_sign() {
        assert_eq!(count_unique_numbers(&[0.0, -0.0, 1.0, 1.0]), 2);
    }

    #[test]
    fn test_breakdown_order_and_limit() {
        let cells = vec![
            text("b"),
            text("a"),
            text("a"),
            Cell::Absent,
            text("c"),
            text("b"),
            text("a"),
        ];
        let breakdown = category_breakdown(&cells, 2);
        assert_eq!(
            breakdown,
            vec![
                ValueCount {
                    value: "a".to_string(),
                    count: 3
                },
                ValueCount {
                    value: "b".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_breakdown_missing_label() {
        let cells = vec![Cell::Empty, Cell::Absent, Cell::Number(0.0)];
        let breakdown = category_breakdown(&cells, 5);
        assert_eq!(breakdown[0].value, "N/A");
        assert_eq!(breakdown[0].count, 2);
        assert_eq!(breakdown[1].value, "0");
    }

    #[test]
    fn test_breakdown_disabled() {
        let cells = vec![text("a")];
        assert!(category_breakdown(&cells, 0).is_empty());
    }

    #[test]
    fn test_breakdown_labels_merge_number_and_text() {
        let cells = vec![Cell::Number(1.0), text("1")];
        assert_eq!(count_unique(&cells, false), 2);
        assert_eq!(
            category_breakdown(&cells, 5),
            vec![ValueCount {
                value: "1".to_string(),
                count: 2
            }]
        );
    }
}
