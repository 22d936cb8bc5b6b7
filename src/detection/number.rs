use once_cell::sync::Lazy;
use regex::Regex;

/// Decimal literal: optional sign, digits with an optional fraction (or a bare
/// fraction), optional exponent. Hex, `inf` and `nan` spellings do not match.
static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").unwrap()
});

/// Parse text as a number.
///
/// This is the only string-to-number conversion in the crate: the decoder
/// uses it for dynamic typing and the profiler uses it for type inference,
/// so both always agree on what "numeric" means.
///
/// Surrounding ASCII whitespace is ignored. Empty or whitespace-only text,
/// trailing garbage (`"42 kg"`) and non-decimal spellings return `None`.
/// Literals too large for `f64` (`"1e400"`) are accepted and yield infinity.
pub fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim_matches(|c: char| c.is_ascii_whitespace());
    if value.is_empty() || !NUMBER_REGEX.is_match(value) {
        return None;
    }

    value.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Check whether text is a valid decimal literal
pub fn is_numeric(value: &str) -> bool {
    parse_number(value).is_some()
}
