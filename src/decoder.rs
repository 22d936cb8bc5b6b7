use crate::detection::header::field_name;
use crate::detection::{
    decode_to_utf8, detect_charset, detect_delimiter, detect_quote_char, has_header,
    parse_number, Charset,
};
use crate::error::{ProfilerError, Result};
use crate::types::constants::{DEFAULT_QUOTE, DEFAULT_SCAN_LINES};
use crate::types::{Cell, DecodeErrorType, Record, Table};
use crate::validation::{count_lines, dedupe_headers, is_binary_data};
use tracing::{debug, info, warn};

/// How the first row of the file is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum HeaderMode {
    /// The first row always names the columns.
    #[default]
    FirstRow,
    /// The first row is a header unless every field in it is numeric.
    Auto,
    /// There is no header row; columns are named `Field1..FieldN`.
    None,
}

/// Decoder settings; `None` means detect from the content
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    pub header_mode: HeaderMode,
    pub delimiter: Option<char>,
    pub quote: Option<char>,
    /// Lines sampled for quote and delimiter detection
    pub scan_lines: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            header_mode: HeaderMode::default(),
            delimiter: None,
            quote: None,
            scan_lines: DEFAULT_SCAN_LINES,
        }
    }
}

/// A decoded table plus what was detected along the way
#[derive(Debug, Clone)]
pub struct DecodedTable {
    pub table: Table,
    pub charset: Charset,
    pub delimiter: char,
    pub quote: char,
    pub has_header: bool,
}

/// Type a raw field: empty text is `Empty`, decimal literals are numbers,
/// everything else stays text.
pub fn dynamic_cell(field: &str) -> Cell {
    if field.is_empty() {
        return Cell::Empty;
    }
    match parse_number(field) {
        Some(n) => Cell::Number(n),
        None => Cell::Text(field.to_string()),
    }
}

fn ascii_byte(c: char, what: &str) -> Result<u8> {
    u8::try_from(c)
        .ok()
        .filter(|b| b.is_ascii())
        .ok_or_else(|| ProfilerError::ConfigError(format!("{} must be ASCII, got {:?}", what, c)))
}

/// Detection results gathered so far; fields stay `None` for stages that
/// were not reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Detection {
    pub charset: Option<Charset>,
    pub delimiter: Option<char>,
    pub quote: Option<char>,
}

impl Detection {
    pub fn of(decoded: &DecodedTable) -> Self {
        Detection {
            charset: Some(decoded.charset),
            delimiter: Some(decoded.delimiter),
            quote: Some(decoded.quote),
        }
    }
}

/// Decode raw file bytes into a table.
pub fn decode(data: &[u8], options: &DecodeOptions) -> Result<DecodedTable> {
    decode_tracked(data, options, &mut Detection::default())
}

/// Like [`decode`], recording each detection result in `detection` as soon
/// as it is known so a failing decode can still report them.
pub fn decode_tracked(
    data: &[u8],
    options: &DecodeOptions,
    detection: &mut Detection,
) -> Result<DecodedTable> {
    *detection = Detection::default();
    if data.is_empty() {
        return Err(ProfilerError::Decode(DecodeErrorType::Sample));
    }

    let charset = detect_charset(data);
    detection.charset = Some(charset);
    let is_utf16 =
        charset.encoding == encoding_rs::UTF_16LE || charset.encoding == encoding_rs::UTF_16BE;
    if !is_utf16 && is_binary_data(data) {
        return Err(ProfilerError::Decode(DecodeErrorType::Binary));
    }

    let text = decode_to_utf8(data, charset)?;
    debug!(
        charset = %charset.name(),
        lines = count_lines(text.as_bytes()),
        "decoded file text"
    );

    let sample: Vec<&str> = text.lines().take(options.scan_lines).collect();
    let quote = options
        .quote
        .or_else(|| detect_quote_char(&sample))
        .unwrap_or(DEFAULT_QUOTE);
    let delimiter = options
        .delimiter
        .or_else(|| detect_delimiter(&sample, Some(quote)))
        .unwrap_or(',');
    detection.quote = Some(quote);
    detection.delimiter = Some(delimiter);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(ascii_byte(delimiter, "Delimiter")?)
        .quote(ascii_byte(quote, "Quote character")?)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        // Lines with no content at all are not records
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    let first_row = match rows.first() {
        Some(row) => row,
        None => return Err(ProfilerError::Decode(DecodeErrorType::Sample)),
    };

    let header_present = match options.header_mode {
        HeaderMode::FirstRow => true,
        HeaderMode::Auto => has_header(first_row),
        HeaderMode::None => false,
    };

    let (raw_headers, data_rows) = if header_present {
        (first_row.clone(), &rows[1..])
    } else {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        ((0..width).map(field_name).collect(), &rows[..])
    };

    let (headers, renames) = dedupe_headers(&raw_headers);
    for rename in &renames {
        warn!(
            column = rename.column,
            original = %rename.original,
            renamed = %rename.renamed,
            "renamed header"
        );
    }

    let mut surplus_fields = 0;
    let records: Vec<Record> = data_rows
        .iter()
        .map(|row| {
            surplus_fields += row.len().saturating_sub(headers.len());
            headers
                .iter()
                .zip(row.iter())
                .map(|(header, field)| (header.clone(), dynamic_cell(field)))
                .collect()
        })
        .collect();
    if surplus_fields > 0 {
        debug!(surplus_fields, "dropped fields beyond the header width");
    }

    info!(
        charset = %charset.name(),
        delimiter = ?delimiter,
        has_header = header_present,
        rows = records.len(),
        columns = headers.len(),
        "decoded table"
    );

    Ok(DecodedTable {
        table: Table::new(headers, records),
        charset,
        delimiter,
        quote,
        has_header: header_present,
    })
}
