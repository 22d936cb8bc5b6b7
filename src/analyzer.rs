use crate::cache::ProfileCache;
use crate::config::Config;
use crate::decoder::{decode_tracked, DecodeOptions, DecodedTable, Detection};
use crate::error::{ProfilerError, Result};
use crate::fingerprint::Fingerprint;
use crate::history::{HistoryStore, NewHistoryEntry};
use crate::output::{cell_to_json, ErrorResponse, HistoryResponse, SuccessResponse};
use crate::profile::{profile_table, ProfileOptions};
use crate::types::{cell, DatasetSummary};
use crate::validation::check_file_size;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// A decoded file together with its profile
#[derive(Debug, Clone)]
pub struct ProfiledDataset {
    pub fingerprint: Fingerprint,
    pub file_size: u64,
    pub decoded: DecodedTable,
    pub summary: DatasetSummary,
}

impl ProfiledDataset {
    /// Decode and profile raw file content
    pub fn from_bytes(
        data: &[u8],
        decode_options: &DecodeOptions,
        profile_options: &ProfileOptions,
    ) -> Result<Self> {
        Self::from_bytes_tracked(data, decode_options, profile_options, &mut Detection::default())
    }

    /// Like [`ProfiledDataset::from_bytes`], keeping what detection found
    /// even when decoding fails.
    pub fn from_bytes_tracked(
        data: &[u8],
        decode_options: &DecodeOptions,
        profile_options: &ProfileOptions,
        detection: &mut Detection,
    ) -> Result<Self> {
        let decoded = decode_tracked(data, decode_options, detection)?;
        let summary = profile_table(&decoded.table, profile_options);

        Ok(ProfiledDataset {
            fingerprint: Fingerprint::of(data),
            file_size: data.len() as u64,
            decoded,
            summary,
        })
    }
}

/// Reads a CSV file, profiles it and reports the result as JSON
pub struct CsvProfiler {
    config: Config,
    cache: ProfileCache,
    history: Option<Box<dyn HistoryStore>>,
    detection: Detection,
}

impl CsvProfiler {
    pub fn new(config: Config) -> Self {
        CsvProfiler {
            config,
            cache: ProfileCache::new(),
            history: None,
            detection: Detection::default(),
        }
    }

    pub fn with_history(mut self, store: Box<dyn HistoryStore>) -> Self {
        self.history = Some(store);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the analysis and return JSON result
    pub fn analyze(&mut self) -> String {
        match self.analyze_internal() {
            Ok(response) => response.to_json(),
            Err(e) => self.build_error_response(e).to_json(),
        }
    }

    /// Run the analysis and return the typed response
    pub fn analyze_internal(&mut self) -> Result<SuccessResponse> {
        let dataset = self.profile_file()?;
        let decoded = &dataset.decoded;

        let mut response = SuccessResponse::new(self.file_name(), decoded.charset.name());
        response.file_size = dataset.file_size;
        response.fingerprint = dataset.fingerprint.to_string();
        response.has_header = decoded.has_header;
        response.set_field_separator(decoded.delimiter);
        response.set_text_delimiter(decoded.quote);
        response.headers = decoded.table.headers.clone();
        response.summary = dataset.summary.clone();
        response.preview = decoded
            .table
            .records
            .iter()
            .take(self.config.preview_rows)
            .map(|record| {
                decoded
                    .table
                    .headers
                    .iter()
                    .map(|h| cell_to_json(cell(record, h)))
                    .collect()
            })
            .collect();
        response.history_id = self.record_history(&dataset);

        Ok(response)
    }

    /// Read and profile the configured file, reusing a cached profile when
    /// the content has been seen before.
    pub fn profile_file(&mut self) -> Result<Arc<ProfiledDataset>> {
        self.detection = Detection::default();
        let path = Path::new(&self.config.filename);
        let size = fs::metadata(path)?.len();
        check_file_size(size, self.config.max_file_bytes)?;

        let data = fs::read(path)?;
        let decode_options = &self.config.decode;
        let profile_options = &self.config.profile;
        let detection = &mut self.detection;
        let dataset = self.cache.get_or_profile(&data, |bytes| {
            ProfiledDataset::from_bytes_tracked(bytes, decode_options, profile_options, detection)
        })?;
        self.detection = Detection::of(&dataset.decoded);

        info!(
            file = %self.config.filename,
            fingerprint = %dataset.fingerprint,
            rows = dataset.summary.total_rows,
            columns = dataset.summary.total_columns,
            "profiled file"
        );
        Ok(dataset)
    }

    /// List the configured user's history
    pub fn history(&mut self) -> Result<HistoryResponse> {
        let user_id = self.config.user_id.clone().ok_or_else(|| {
            ProfilerError::ConfigError("A user id is required to list history".to_string())
        })?;
        let store = self.history.as_mut().ok_or_else(|| {
            ProfilerError::ConfigError("No history store configured".to_string())
        })?;

        Ok(HistoryResponse {
            datasets: store.list(&user_id)?,
            user_id,
        })
    }

    /// Record a history entry; failures are logged and never fail the analysis.
    fn record_history(&mut self, dataset: &ProfiledDataset) -> Option<i64> {
        let user_id = self.config.user_id.clone()?;
        let file_name = self.file_name();
        let store = self.history.as_mut()?;

        let entry = NewHistoryEntry {
            user_id,
            file_name,
            file_size: dataset.file_size,
            fingerprint: dataset.fingerprint.clone(),
            total_rows: dataset.summary.total_rows,
            total_columns: dataset.summary.total_columns,
        };

        match store.record(entry) {
            Ok(stored) => Some(stored.id),
            Err(e) => {
                warn!("Could not record dataset history: {}", e);
                None
            }
        }
    }

    /// File name without its directory
    fn file_name(&self) -> String {
        Path::new(&self.config.filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.config.filename.clone())
    }

    /// Build error response
    fn build_error_response(&self, error: ProfilerError) -> ErrorResponse {
        warn!("Analysis failed: {}", error);

        let detection = self.detection;
        ErrorResponse::new(error.error_type(), self.file_name())
            .with_internal_message(error.to_string())
            .with_charset(detection.charset.map(|c| c.name()).unwrap_or_default())
            .with_field_separator(detection.delimiter.unwrap_or('\0'))
            .with_text_delimiter(detection.quote.unwrap_or('\0'))
    }
}
