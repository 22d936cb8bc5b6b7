use crate::types::DecodeErrorType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error("Decode error: {0}")]
    Decode(DecodeErrorType),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ProfilerError {
    pub fn error_type(&self) -> DecodeErrorType {
        match self {
            ProfilerError::Decode(t) => *t,
            ProfilerError::IoError(_) => DecodeErrorType::Process,
            ProfilerError::CsvError(_) => DecodeErrorType::Malformed,
            ProfilerError::DatabaseError(_) => DecodeErrorType::Database,
            ProfilerError::ConfigError(_) => DecodeErrorType::Process,
            ProfilerError::EncodingError(_) => DecodeErrorType::Encoding,
            ProfilerError::JsonError(_) => DecodeErrorType::Process,
        }
    }
}

impl From<postgres::Error> for ProfilerError {
    fn from(e: postgres::Error) -> Self {
        ProfilerError::DatabaseError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProfilerError>;
