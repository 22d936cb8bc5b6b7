use crate::config::DbConfig;
use crate::error::{ProfilerError, Result};
use crate::fingerprint::Fingerprint;
use chrono::{DateTime, Utc};
use postgres::{Client, NoTls, Row};
use serde::Serialize;
use tracing::{debug, info};

/// A stored history row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub user_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub fingerprint: Fingerprint,
    pub total_rows: usize,
    pub total_columns: usize,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when recording a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub user_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub fingerprint: Fingerprint,
    pub total_rows: usize,
    pub total_columns: usize,
}

/// Durable per-user dataset history
pub trait HistoryStore {
    fn record(&mut self, entry: NewHistoryEntry) -> Result<HistoryEntry>;

    /// All entries of one user, newest first.
    fn list(&mut self, user_id: &str) -> Result<Vec<HistoryEntry>>;

    /// Newest entry of one user for the given content, if any.
    fn find_by_fingerprint(
        &mut self,
        user_id: &str,
        fingerprint: &Fingerprint,
    ) -> Result<Option<HistoryEntry>> {
        Ok(self
            .list(user_id)?
            .into_iter()
            .find(|e| &e.fingerprint == fingerprint))
    }
}

/// In-process store, used in tests and when no database is configured
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Vec<HistoryEntry>,
    next_id: i64,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn record(&mut self, entry: NewHistoryEntry) -> Result<HistoryEntry> {
        self.next_id += 1;
        let stored = HistoryEntry {
            id: self.next_id,
            user_id: entry.user_id,
            file_name: entry.file_name,
            file_size: entry.file_size,
            fingerprint: entry.fingerprint,
            total_rows: entry.total_rows,
            total_columns: entry.total_columns,
            created_at: Utc::now(),
        };
        self.entries.push(stored.clone());
        Ok(stored)
    }

    fn list(&mut self, user_id: &str) -> Result<Vec<HistoryEntry>> {
        let mut entries: Vec<HistoryEntry> = self
            .entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        // Ids break ties between entries recorded within the same clock tick
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }
}

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS dataset_history (
    id BIGSERIAL PRIMARY KEY,
    user_id TEXT NOT NULL,
    file_name TEXT NOT NULL,
    file_size BIGINT NOT NULL,
    fingerprint TEXT NOT NULL,
    total_rows BIGINT NOT NULL,
    total_columns BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

const SELECT_COLUMNS: &str = "id, user_id, file_name, file_size, fingerprint, \
     total_rows, total_columns, EXTRACT(EPOCH FROM created_at)::BIGINT";

/// PostgreSQL-backed store using the `dataset_history` table
pub struct PgHistoryStore {
    client: Client,
}

impl PgHistoryStore {
    /// Connect and make sure the history table exists
    pub fn connect(config: &DbConfig) -> Result<Self> {
        let mut client = Client::connect(&config.connection_string(), NoTls).map_err(|e| {
            ProfilerError::DatabaseError(format!("Failed to connect to history database: {}", e))
        })?;

        client.batch_execute(CREATE_TABLE_SQL).map_err(|e| {
            ProfilerError::DatabaseError(format!("Failed to create dataset_history: {}", e))
        })?;

        info!(host = %config.host, database = %config.database, "connected to history store");
        Ok(PgHistoryStore { client })
    }
}

fn to_i64(value: u64, what: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| ProfilerError::DatabaseError(format!("{} out of range: {}", what, value)))
}

fn non_negative(value: i64, what: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| ProfilerError::DatabaseError(format!("Negative {} in history: {}", what, value)))
}

fn entry_from_row(row: &Row) -> Result<HistoryEntry> {
    let epoch: i64 = row.try_get(7)?;
    let created_at = DateTime::<Utc>::from_timestamp(epoch, 0).ok_or_else(|| {
        ProfilerError::DatabaseError(format!("Invalid created_at timestamp: {}", epoch))
    })?;

    Ok(HistoryEntry {
        id: row.try_get(0)?,
        user_id: row.try_get(1)?,
        file_name: row.try_get(2)?,
        file_size: non_negative(row.try_get(3)?, "file_size")?,
        fingerprint: Fingerprint::from_stored(row.try_get::<_, String>(4)?),
        total_rows: non_negative(row.try_get(5)?, "total_rows")? as usize,
        total_columns: non_negative(row.try_get(6)?, "total_columns")? as usize,
        created_at,
    })
}

impl HistoryStore for PgHistoryStore {
    fn record(&mut self, entry: NewHistoryEntry) -> Result<HistoryEntry> {
        let sql = format!(
            "INSERT INTO dataset_history \
             (user_id, file_name, file_size, fingerprint, total_rows, total_columns) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            SELECT_COLUMNS
        );

        let row = self
            .client
            .query_one(
                sql.as_str(),
                &[
                    &entry.user_id,
                    &entry.file_name,
                    &to_i64(entry.file_size, "file_size")?,
                    &entry.fingerprint.as_str(),
                    &to_i64(entry.total_rows as u64, "total_rows")?,
                    &to_i64(entry.total_columns as u64, "total_columns")?,
                ],
            )
            .map_err(|e| {
                ProfilerError::DatabaseError(format!("Failed to insert history entry: {}", e))
            })?;

        let stored = entry_from_row(&row)?;
        debug!(id = stored.id, user = %stored.user_id, "recorded history entry");
        Ok(stored)
    }

    fn list(&mut self, user_id: &str) -> Result<Vec<HistoryEntry>> {
        let sql = format!(
            "SELECT {} FROM dataset_history WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        );

        let rows = self.client.query(sql.as_str(), &[&user_id]).map_err(|e| {
            ProfilerError::DatabaseError(format!("Failed to query dataset_history: {}", e))
        })?;

        rows.iter().map(entry_from_row).collect()
    }

    fn find_by_fingerprint(
        &mut self,
        user_id: &str,
        fingerprint: &Fingerprint,
    ) -> Result<Option<HistoryEntry>> {
        let sql = format!(
            "SELECT {} FROM dataset_history WHERE user_id = $1 AND fingerprint = $2 \
             ORDER BY created_at DESC, id DESC LIMIT 1",
            SELECT_COLUMNS
        );

        let row = self
            .client
            .query_opt(sql.as_str(), &[&user_id, &fingerprint.as_str()])
            .map_err(|e| {
                ProfilerError::DatabaseError(format!("Failed to query dataset_history: {}", e))
            })?;

        row.as_ref().map(entry_from_row).transpose()
    }
}
