pub mod charset;
pub mod delimiter;
pub mod header;
pub mod number;
pub mod quote;

pub use charset::{decode_to_utf8, detect_charset, Charset};
pub use delimiter::detect_delimiter;
pub use header::has_header;
pub use number::{is_numeric, parse_number};
pub use quote::detect_quote_char;
