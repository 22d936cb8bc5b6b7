use crate::types::constants::{DEFAULT_QUOTE, TEXT_SEPS, TEXT_SEP_PERCENT};

/// Detect the text/quote separator character.
///
/// A candidate is rejected if any line holds an odd number of it. The double
/// quote wins whenever it appears balanced at all; other candidates must
/// appear on at least `TEXT_SEP_PERCENT` of the lines, most occurrences first.
pub fn detect_quote_char(lines: &[&str]) -> Option<char> {
    let lines: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|l| !l.trim().is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }

    let candidates: Vec<(char, usize, usize)> = TEXT_SEPS
        .iter()
        .filter_map(|&sep| {
            let mut total = 0;
            let mut lines_present = 0;
            for line in &lines {
                let count = line.chars().filter(|&ch| ch == sep).count();
                // An odd count on any line disqualifies the candidate
                if count % 2 != 0 {
                    return None;
                }
                total += count;
                if count > 0 {
                    lines_present += 1;
                }
            }
            Some((sep, total, lines_present))
        })
        .filter(|&(_, total, _)| total > 0)
        .collect();

    if candidates.iter().any(|&(sep, _, _)| sep == DEFAULT_QUOTE) {
        return Some(DEFAULT_QUOTE);
    }

    candidates
        .into_iter()
        .filter(|&(_, _, lines_present)| (lines_present * 100 / lines.len()) >= TEXT_SEP_PERCENT)
        .max_by_key(|&(_, total, _)| total)
        .map(|(sep, _, _)| sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_double_quote() {
        let lines = vec![r#""Alice","30","NYC""#, r#""Bob","25","LA""#];
        assert_eq!(detect_quote_char(&lines), Some('"'));
    }

    #[test]
    fn test_detect_single_quote() {
        let lines = vec!["'Alice','30','NYC'", "'Bob','25','LA'"];
        assert_eq!(detect_quote_char(&lines), Some('\''));
    }

    #[test]
    fn test_no_quotes() {
        let lines = vec!["Alice,30,NYC", "Bob,25,LA"];
        assert_eq!(detect_quote_char(&lines), None);
    }

    #[test]
    fn test_unbalanced_quotes() {
        let lines = vec![r#""Alice,30,NYC"#];
        assert_eq!(detect_quote_char(&lines), None);
    }

    #[test]
    fn test_apostrophe_in_text_does_not_win() {
        let lines = vec![r#""O'Brien",1"#, r#""Smith",2"#];
        assert_eq!(detect_quote_char(&lines), Some('"'));
    }

    #[test]
    fn test_double_quote_beats_frequent_apostrophes() {
        let lines = vec![
            "name,note,addr",
            r#"A,'x',"1, Main""#,
            "B,'y',Elm",
            "C,'z',Oak",
        ];
        assert_eq!(detect_quote_char(&lines), Some('"'));
    }

    #[test]
    fn test_unbalanced_double_quote_falls_back() {
        let lines = vec![r#"'a',5" pipe"#, "'b',x", "'c',y"];
        assert_eq!(detect_quote_char(&lines), Some('\''));
    }
}
