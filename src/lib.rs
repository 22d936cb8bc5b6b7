pub mod analyzer;
pub mod cache;
pub mod config;
pub mod decoder;
pub mod detection;
pub mod error;
pub mod fingerprint;
pub mod history;
pub mod output;
pub mod profile;
pub mod types;
pub mod validation;

pub use analyzer::{CsvProfiler, ProfiledDataset};
pub use cache::ProfileCache;
pub use config::{Config, DbConfig};
pub use decoder::{decode, DecodeOptions, DecodedTable, Detection, HeaderMode};
pub use error::{ProfilerError, Result};
pub use fingerprint::Fingerprint;
pub use history::{HistoryEntry, HistoryStore, MemoryHistoryStore, PgHistoryStore};
pub use profile::{profile, profile_with, ProfileOptions};
pub use types::{Cell, ColumnSummary, DataType, DatasetSummary, DecodeErrorType, Record, Table};
