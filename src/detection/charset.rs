use crate::error::{ProfilerError, Result};
use crate::types::constants::CSVA_GUESS_SIZE;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::{debug, warn};

/// Allow guessing UTF-8 encoding
const ALLOW_UTF8: bool = true;

/// Detected text encoding of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    pub encoding: &'static Encoding,
    /// Length of the byte order mark, 0 when there is none.
    pub bom_len: usize,
}

impl Charset {
    pub fn utf8() -> Self {
        Charset {
            encoding: encoding_rs::UTF_8,
            bom_len: 0,
        }
    }

    /// Short, normalized name used in responses.
    pub fn name(&self) -> String {
        let base = normalize_encoding(self.encoding.name());
        if self.bom_len > 0 && self.encoding == encoding_rs::UTF_8 {
            "UTF-8BOM".to_string()
        } else {
            base
        }
    }

    fn is_unicode(&self) -> bool {
        self.encoding == encoding_rs::UTF_8
            || self.encoding == encoding_rs::UTF_16LE
            || self.encoding == encoding_rs::UTF_16BE
    }
}

/// Detect the character encoding of the given data.
pub fn detect_charset(data: &[u8]) -> Charset {
    if let Some((encoding, bom_len)) = Encoding::for_bom(data) {
        return Charset { encoding, bom_len };
    }

    // Small valid UTF-8 files skip the statistical detector
    if data.len() <= CSVA_GUESS_SIZE && std::str::from_utf8(data).is_ok() {
        return Charset::utf8();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(data, true);
    let encoding = detector.guess(None, ALLOW_UTF8);
    debug!(encoding = encoding.name(), "guessed charset");

    Charset {
        encoding,
        bom_len: 0,
    }
}

/// Normalize encoding name
fn normalize_encoding(name: &str) -> String {
    let name_lower = name.to_lowercase();
    match name_lower.as_str() {
        "utf-8" => "utf8".to_string(),
        "utf-16le" => "UTF-16LE".to_string(),
        "utf-16be" => "UTF-16BE".to_string(),
        "windows-1252" => "cp1252".to_string(),
        "windows-1251" => "cp1251".to_string(),
        "windows-1250" => "cp1250".to_string(),
        _ => name_lower.replace(['-', '_'], ""),
    }
}

/// Transcode data to UTF-8, dropping any byte order mark.
///
/// Malformed Unicode input is rejected. Legacy single-byte encodings never
/// fail; unmappable bytes become U+FFFD and a warning is logged.
pub fn decode_to_utf8(data: &[u8], charset: Charset) -> Result<String> {
    let body = &data[charset.bom_len.min(data.len())..];
    let (decoded, had_errors) = charset.encoding.decode_without_bom_handling(body);

    if had_errors {
        if charset.is_unicode() {
            return Err(ProfilerError::EncodingError(format!(
                "Invalid {} byte sequence",
                charset.encoding.name()
            )));
        }
        warn!(
            charset = %charset.name(),
            "replaced unmappable bytes while decoding"
        );
    }

    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_utf8_bom() {
        let data = [0xEF, 0xBB, 0xBF, b'h', b'e', b'l', b'l', b'o'];
        let charset = detect_charset(&data);
        assert_eq!(charset.name(), "UTF-8BOM");
        assert_eq!(charset.bom_len, 3);
        assert_eq!(decode_to_utf8(&data, charset).unwrap(), "hello");
    }

    #[test]
    fn test_detect_utf16_le_bom() {
        let data = [0xFF, 0xFE, b'h', 0, b'i', 0];
        let charset = detect_charset(&data);
        assert_eq!(charset.name(), "UTF-16LE");
        assert_eq!(decode_to_utf8(&data, charset).unwrap(), "hi");
    }

    #[test]
    fn test_detect_utf8() {
        let data = b"Hello, World!";
        assert_eq!(detect_charset(data).name(), "utf8");
    }

    #[test]
    fn test_decode_latin1() {
        // "café" in windows-1252
        let data = [b'c', b'a', b'f', 0xE9];
        let charset = Charset {
            encoding: encoding_rs::WINDOWS_1252,
            bom_len: 0,
        };
        assert_eq!(decode_to_utf8(&data, charset).unwrap(), "café");
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let data = [0xEF, 0xBB, 0xBF, 0xC3, 0x28];
        let charset = detect_charset(&data);
        assert!(decode_to_utf8(&data, charset).is_err());
    }
}
