use crate::detection::number::is_numeric;

/// Decide whether the first row of a file is a header row.
///
/// A first row made only of numeric fields is data, as is a row with no
/// content at all. Anything else is taken to be a header.
pub fn has_header(first_row: &[String]) -> bool {
    let non_blank: Vec<&str> = first_row
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect();

    if non_blank.is_empty() {
        return false;
    }

    !non_blank.iter().all(|f| is_numeric(f))
}

/// Synthesized header name for a 0-based column index
pub fn field_name(col_idx: usize) -> String {
    format!("Field{}", col_idx + 1)
}
