//! SQLite document store.

use crate::validate_table_name;
use capture_core::{BoxFuture, Entry, EntryStore, StoreError};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

fn backend(context: &str, err: rusqlite::Error) -> StoreError {
    StoreError::backend(format!("{context}: {err}"))
}

/// Stores each entry as one row holding its JSON document.
///
/// The connection sits behind a mutex, so concurrent saves are serialized.
/// Inserts run on the blocking thread pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Option<Connection>>>,
    table: String,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: &Path, table: &str) -> Result<Self, StoreError> {
        validate_table_name(table)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Config(format!(
                    "failed to create db directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let conn = Connection::open(path)
            .map_err(|e| backend(&format!("failed to open db at {}", path.display()), e))?;
        tracing::debug!(path = %path.display(), table, "sqlite store opened");
        Self::init(conn, table)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory(table: &str) -> Result<Self, StoreError> {
        validate_table_name(table)?;
        let conn =
            Connection::open_in_memory().map_err(|e| backend("failed to open in-memory db", e))?;
        Self::init(conn, table)
    }

    fn init(conn: Connection, table: &str) -> Result<Self, StoreError> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                entry_id TEXT PRIMARY KEY,
                campaign_name TEXT NOT NULL,
                campaign_version TEXT NOT NULL,
                email_address TEXT NOT NULL,
                document TEXT NOT NULL,
                created_at TEXT NOT NULL
            );"
        ))
        .map_err(|e| backend("failed to apply schema", e))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            table: table.to_string(),
        })
    }

    /// Returns the number of stored entries.
    pub fn count(&self) -> Result<u64, StoreError> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| {
                row.get(0)
            })
            .map_err(|e| backend("failed to count entries", e))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Loads the stored JSON document for `entry_id`.
    pub fn document(&self, entry_id: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let raw: Option<String> = conn
            .query_row(
                &format!("SELECT document FROM {} WHERE entry_id = ?1", self.table),
                params![entry_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| backend("failed to load entry", e))?;
        raw.map(|s| serde_json::from_str(&s).map_err(StoreError::from))
            .transpose()
    }
}

impl EntryStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn save<'a>(&'a self, entry: &'a Entry) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let document = serde_json::to_string(entry)?;
            let row = (
                entry.public_id().to_string(),
                entry.campaign_name.clone(),
                entry.campaign_version.clone(),
                entry.entrant.email_address.clone(),
            );
            let sql = format!(
                "INSERT INTO {} (entry_id, campaign_name, campaign_version, email_address, document, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                self.table
            );
            let conn = Arc::clone(&self.conn);

            tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
                let guard = conn.lock();
                let conn = guard.as_ref().ok_or(StoreError::Closed)?;
                conn.execute(
                    &sql,
                    params![row.0, row.1, row.2, row.3, document, Utc::now().to_rfc3339()],
                )
                .map_err(|e| backend("failed to insert entry", e))?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::backend(format!("insert task failed: {e}")))?
        })
    }

    fn close(&self) {
        if let Some(conn) = self.conn.lock().take() {
            if let Err((_, e)) = conn.close() {
                tracing::warn!(error = %e, "failed to close sqlite connection");
            }
        }
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}
