use crate::history::HistoryEntry;
use crate::types::{Cell, DataType, DatasetSummary, DecodeErrorType};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

/// Two-digit hex code of a separator character, empty when unset
pub fn separator_hex(sep: char) -> String {
    if sep == '\0' {
        String::new()
    } else {
        format!("{:02X}", sep as u32)
    }
}

/// JSON scalar for a preview cell; missing and non-finite values are `null`.
pub fn cell_to_json(cell: &Cell) -> Value {
    match cell {
        Cell::Absent | Cell::Empty => Value::Null,
        Cell::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Cell::Text(s) if s.is_empty() => Value::Null,
        Cell::Text(s) => Value::String(s.clone()),
    }
}

/// Success response JSON structure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub file_name: String,
    pub file_size: u64,
    pub fingerprint: String,
    pub charset: String,
    pub field_separator: String,
    pub text_delimiter: String,
    pub has_header: bool,
    pub headers: Vec<String>,
    pub summary: DatasetSummary,
    pub preview: Vec<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_id: Option<i64>,
}

impl SuccessResponse {
    pub fn new(file_name: String, charset: String) -> Self {
        SuccessResponse {
            file_name,
            file_size: 0,
            fingerprint: String::new(),
            charset,
            field_separator: String::new(),
            text_delimiter: String::new(),
            has_header: true,
            headers: Vec::new(),
            summary: DatasetSummary::default(),
            preview: Vec::new(),
            history_id: None,
        }
    }

    pub fn set_field_separator(&mut self, sep: char) {
        self.field_separator = separator_hex(sep);
    }

    pub fn set_text_delimiter(&mut self, delim: char) {
        self.text_delimiter = separator_hex(delim);
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Error response JSON structure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: DecodeErrorType,
    pub error_msg_user: String,
    pub error_msg_internal: String,
    pub file_name: String,
    pub charset: String,
    pub field_separator: String,
    pub text_delimiter: String,
}

impl ErrorResponse {
    pub fn new(error_type: DecodeErrorType, file_name: String) -> Self {
        ErrorResponse {
            error: error_type,
            error_msg_user: error_type.message().to_string(),
            error_msg_internal: String::new(),
            file_name,
            charset: String::new(),
            field_separator: String::new(),
            text_delimiter: String::new(),
        }
    }

    /// Set internal error message
    pub fn with_internal_message(mut self, msg: String) -> Self {
        self.error_msg_internal = msg;
        self
    }

    pub fn with_charset(mut self, charset: String) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_field_separator(mut self, sep: char) -> Self {
        self.field_separator = separator_hex(sep);
        self
    }

    pub fn with_text_delimiter(mut self, delim: char) -> Self {
        self.text_delimiter = separator_hex(delim);
        self
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// History listing JSON structure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub user_id: String,
    pub datasets: Vec<HistoryEntry>,
}

impl HistoryResponse {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn fixed2(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

/// Human-readable dataset overview
pub fn render_text(file_name: &str, summary: &DatasetSummary) -> String {
    let mut out = String::new();
    let total = summary.total_rows;
    let missing_columns = match summary.missing_value_columns.len() {
        0 => "None".to_string(),
        n => n.to_string(),
    };

    // Writing to a String cannot fail
    let _ = writeln!(out, "Dataset Overview: {}", file_name);
    let _ = writeln!(out, "Rows: {}", total);
    let _ = writeln!(out, "Columns: {}", summary.total_columns);
    let _ = writeln!(out, "Missing Data: {}", missing_columns);

    let numeric: Vec<_> = summary.columns_of_type(DataType::Numeric).collect();
    if !numeric.is_empty() {
        let _ = writeln!(out, "\nNumeric Columns");
        for (name, column) in numeric {
            let _ = writeln!(out, "  {}", name);
            let _ = writeln!(
                out,
                "    Range: {} - {}",
                fixed2(column.min()),
                fixed2(column.max())
            );
            let _ = writeln!(out, "    Mean: {}", fixed2(column.mean()));
            let _ = writeln!(out, "    Median: {}", fixed2(column.median()));
            let _ = writeln!(
                out,
                "    Missing: {} ({:.1}%)",
                column.missing_values,
                column.missing_ratio(total) * 100.0
            );
        }
    }

    let categorical: Vec<_> = summary.columns_of_type(DataType::Categorical).collect();
    if !categorical.is_empty() {
        let _ = writeln!(out, "\nCategorical Columns");
        for (name, column) in categorical {
            let _ = writeln!(out, "  {}", name);
            let _ = writeln!(out, "    Unique Values: {}", column.unique_values);
            let _ = writeln!(
                out,
                "    Missing: {} ({:.1}%)",
                column.missing_values,
                column.missing_ratio(total) * 100.0
            );
            if !column.top_values.is_empty() {
                let top: Vec<String> = column
                    .top_values
                    .iter()
                    .map(|v| format!("{} ({})", v.value, v.count))
                    .collect();
                let _ = writeln!(out, "    Top Values: {}", top.join(", "));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::profile;
    use crate::types::Record;

    fn sample_summary() -> DatasetSummary {
        let headers = vec!["name".to_string(), "age".to_string()];
        let records: Vec<Record> = vec![
            [
                ("name".to_string(), Cell::Text("Alice".to_string())),
                ("age".to_string(), Cell::Number(30.0)),
            ]
            .into_iter()
            .collect(),
            [
                ("name".to_string(), Cell::Text("Bob".to_string())),
                ("age".to_string(), Cell::Empty),
            ]
            .into_iter()
            .collect(),
        ];
        profile(&headers, &records)
    }

    #[test]
    fn test_success_response_json() {
        let mut response = SuccessResponse::new("people.csv".to_string(), "utf8".to_string());
        response.set_field_separator(',');
        response.set_text_delimiter('"');
        response.summary = sample_summary();

        let json: Value = serde_json::from_str(&response.to_json()).unwrap();
        assert_eq!(json["fieldSeparator"], "2C");
        assert_eq!(json["textDelimiter"], "22");
        assert_eq!(json["summary"]["totalRows"], 2);
        assert_eq!(json["summary"]["missingValueColumns"][0], "age");
        let age = &json["summary"]["columnSummaries"]["age"];
        assert_eq!(age["dataType"], "numeric");
        assert_eq!(age["min"], 30.0);
        assert_eq!(age["median"], 30.0);
        let name = &json["summary"]["columnSummaries"]["name"];
        assert_eq!(name["dataType"], "categorical");
        assert!(name.get("min").is_none());
        assert!(json.get("historyId").is_none());
    }

    #[test]
    fn test_error_response_json() {
        let response = ErrorResponse::new(DecodeErrorType::Binary, "x.bin".to_string());
        let json = response.to_json();
        assert!(json.contains("\"error\":3"));
        assert!(json.contains("\"errorMsgUser\":\"File is binary file\""));
    }

    #[test]
    fn test_hex_encoding() {
        assert_eq!(separator_hex(';'), "3B");
        assert_eq!(separator_hex('\t'), "09");
        assert_eq!(separator_hex('\0'), "");
    }

    #[test]
    fn test_cell_to_json() {
        assert_eq!(cell_to_json(&Cell::Absent), Value::Null);
        assert_eq!(cell_to_json(&Cell::Number(2.5)), serde_json::json!(2.5));
        assert_eq!(cell_to_json(&Cell::Number(f64::INFINITY)), Value::Null);
        assert_eq!(cell_to_json(&Cell::Text("a".to_string())), serde_json::json!("a"));
    }

    #[test]
    fn test_render_text() {
        let report = render_text("people.csv", &sample_summary());
        assert!(report.contains("Rows: 2"));
        assert!(report.contains("Missing Data: 1"));
        assert!(report.contains("Range: 30.00 - 30.00"));
        assert!(report.contains("Missing: 1 (50.0%)"));
        assert!(report.contains("Unique Values: 2"));
        assert!(report.contains("Top Values: Alice (1), Bob (1)"));
    }
}
