use crate::detection::number::parse_number;
use crate::types::{Cell, DataType};

/// Numeric value of a cell: numbers pass through, text goes through the
/// shared parser, missing cells have none.
pub fn coerce(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => parse_number(s),
        Cell::Absent | Cell::Empty => None,
    }
}

/// Classify a column as numeric or categorical.
///
/// Missing cells are ignored. The column is numeric only if it has at least
/// one non-missing cell and every non-missing cell is a number or text that
/// parses as one; a single non-numeric cell makes it categorical.
pub fn infer_column_type<'a, I>(cells: I) -> DataType
where
    I: IntoIterator<Item = &'a Cell>,
{
    let mut saw_value = false;

    for cell in cells.into_iter().filter(|c| !c.is_missing()) {
        saw_value = true;
        if coerce(cell).is_none() {
            return DataType::Categorical;
        }
    }

    if saw_value {
        DataType::Numeric
    } else {
        DataType::Categorical
    }
}
