use crate::types::constants::{FIELD_DELIMS, FIELD_DELIM_PERCENT};

/// Detect the field delimiter in CSV lines by counting candidate
/// occurrences outside quoted text.
///
/// The candidate with the highest total wins, provided it appears in at
/// least `FIELD_DELIM_PERCENT` of the non-blank lines. Ties go to the
/// candidate listed first in `FIELD_DELIMS`.
pub fn detect_delimiter(lines: &[&str], text_sep: Option<char>) -> Option<char> {
    let text_sep = text_sep.unwrap_or('\0');
    let lines: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|l| !l.trim().is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }

    // (delimiter, total_count, lines_present)
    let mut delim_stats: Vec<(char, usize, usize)> =
        FIELD_DELIMS.iter().map(|&d| (d, 0, 0)).collect();

    for line in &lines {
        for stat in delim_stats.iter_mut() {
            let count = count_delimiters(stat.0, line, text_sep);
            stat.1 += count;
            if count > 0 {
                stat.2 += 1;
            }
        }
    }

    let mut best: Option<&(char, usize, usize)> = None;
    for stat in delim_stats.iter() {
        if stat.1 > 0 && best.map_or(true, |b| stat.1 > b.1) {
            best = Some(stat);
        }
    }

    best.filter(|&&(_, _, lines_present)| {
        (lines_present * 100) / lines.len() >= FIELD_DELIM_PERCENT
    })
    .map(|&(delim, _, _)| delim)
}

/// Count occurrences of a delimiter in a line, respecting text separators
pub fn count_delimiters(delimiter: char, line: &str, text_sep: char) -> usize {
    let mut count = 0;
    let mut inside_text = false;

    for c in line.chars() {
        if text_sep != '\0' && c == text_sep {
            inside_text = !inside_text;
        }

        if c == delimiter && !inside_text {
            count += 1;
        }
    }

    count
}
