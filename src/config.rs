use crate::decoder::DecodeOptions;
use crate::error::{ProfilerError, Result};
use crate::profile::ProfileOptions;
use crate::types::constants::{DEFAULT_DB_PORT, DEFAULT_PREVIEW_ROWS, MAX_FILE_BYTES};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Config file section holding the history database settings
const HISTORY_SECTION: &str = "HISTORY";

/// History database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    /// Create a new DbConfig with explicit values
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        DbConfig {
            host: host.into(),
            port,
            database: database.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Load configuration from the standard libpq environment variables.
    /// `PGPORT` is optional; the others are required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| {
                ProfilerError::ConfigError(format!("{} environment variable not set", key))
            })
        };

        let port = match lookup("PGPORT") {
            Some(p) => p.parse().map_err(|_| {
                ProfilerError::ConfigError("PGPORT must be a valid port number".to_string())
            })?,
            None => DEFAULT_DB_PORT,
        };

        Ok(DbConfig {
            host: required("PGHOST")?,
            port,
            database: required("PGDATABASE")?,
            user: required("PGUSER")?,
            password: required("PGPASSWORD")?,
        })
    }

    /// Load configuration from an INI-style config file.
    /// Reads from the [HISTORY] section.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ProfilerError::ConfigError(format!("Failed to read config file: {}", e))
        })?;
        Self::from_ini(&content)
    }

    fn from_ini(content: &str) -> Result<Self> {
        let sections = parse_ini(content);

        let history = sections.get(HISTORY_SECTION).ok_or_else(|| {
            ProfilerError::ConfigError(format!(
                "Missing [{}] section in config file",
                HISTORY_SECTION
            ))
        })?;

        let required = |key: &str| {
            history
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| {
                    ProfilerError::ConfigError(format!(
                        "Missing or empty {} in [{}] section",
                        key, HISTORY_SECTION
                    ))
                })
        };

        // Port is optional in the config
        let port = history
            .get("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_DB_PORT);

        Ok(DbConfig {
            host: required("HOSTNAME")?,
            port,
            database: required("DATABASENAME")?,
            user: required("USERNAME")?,
            password: required("PASSWORD")?,
        })
    }

    /// Build PostgreSQL connection string
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            self.host, self.port, self.database, self.user, self.password
        )
    }
}

/// Parse `[SECTION]` / `key=value` text. Section and key names are
/// upper-cased; values are trimmed and unquoted.
fn parse_ini(content: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current_section = String::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current_section = name.trim().to_uppercase();
            sections.entry(current_section.clone()).or_default();
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            if let Some(section) = sections.get_mut(&current_section) {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                section.insert(key.trim().to_uppercase(), value.to_string());
            }
        }
    }

    sections
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub filename: String,
    /// Owner of history entries; history is skipped without one.
    pub user_id: Option<String>,
    pub decode: DecodeOptions,
    pub profile: ProfileOptions,
    pub preview_rows: usize,
    pub max_file_bytes: u64,
    pub db: Option<DbConfig>,
}

impl Config {
    pub fn new(filename: impl Into<String>) -> Self {
        Config {
            filename: filename.into(),
            user_id: None,
            decode: DecodeOptions::default(),
            profile: ProfileOptions::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            max_file_bytes: MAX_FILE_BYTES,
            db: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_db_config(mut self, db: DbConfig) -> Self {
        self.db = Some(db);
        self
    }
}
