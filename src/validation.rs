use crate::detection::header::field_name;
use crate::error::{ProfilerError, Result};
use crate::types::constants::{BINARY_PROBE_BYTES, BINARY_UNPRINTABLE_PERCENT};
use crate::types::DecodeErrorType;
use std::collections::HashSet;

/// Reject files above the configured byte limit
pub fn check_file_size(size: u64, max_bytes: u64) -> Result<()> {
    if size > max_bytes {
        return Err(ProfilerError::Decode(DecodeErrorType::TooLarge));
    }
    Ok(())
}

/// A header that had to be renamed to keep names unique and non-blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRename {
    pub column: usize,
    pub original: String,
    pub renamed: String,
}

/// Make header names unique and non-blank.
///
/// Blank names become `FieldN` (1-based column number). A repeated name gets
/// the first free `_1`, `_2`, ... suffix. Comparison is case-sensitive
/// because records are keyed by exact header text.
pub fn dedupe_headers(headers: &[String]) -> (Vec<String>, Vec<HeaderRename>) {
    let mut taken: HashSet<String> = headers.iter().cloned().collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(headers.len());
    let mut renames = Vec::new();

    for (idx, header) in headers.iter().enumerate() {
        let mut name = if header.trim().is_empty() {
            field_name(idx)
        } else {
            header.clone()
        };

        if seen.contains(&name) {
            let base = name.clone();
            let mut suffix = 1;
            loop {
                let candidate = format!("{}_{}", base, suffix);
                if !taken.contains(&candidate) && !seen.contains(&candidate) {
                    name = candidate;
                    break;
                }
                suffix += 1;
            }
        }

        if &name != header {
            renames.push(HeaderRename {
                column: idx + 1,
                original: header.clone(),
                renamed: name.clone(),
            });
        }
        taken.insert(name.clone());
        seen.insert(name.clone());
        result.push(name);
    }

    (result, renames)
}

/// Check if data appears to be binary.
///
/// Only the first line (at most `BINARY_PROBE_BYTES`) is inspected, after any
/// UTF-8 BOM. Callers must not pass UTF-16 data, whose NUL bytes would
/// look unprintable.
pub fn is_binary_data(data: &[u8]) -> bool {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    let first_line_end = memchr::memchr(b'\n', data)
        .unwrap_or(data.len())
        .min(BINARY_PROBE_BYTES);
    let sample = &data[..first_line_end];

    if sample.is_empty() {
        return false;
    }

    let unprintable_count = sample
        .iter()
        .filter(|&&b| (b < 0x20 && !matches!(b, b'\t' | b'\r')) || b == 0x7F)
        .count();

    (unprintable_count * 100) / sample.len() >= BINARY_UNPRINTABLE_PERCENT
}

/// Count lines in raw data
pub fn count_lines(data: &[u8]) -> usize {
    let newlines = memchr::memchr_iter(b'\n', data).count();
    if data.last().is_some_and(|&b| b != b'\n') {
        newlines + 1
    } else {
        newlines
    }
}
