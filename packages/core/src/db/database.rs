//! Database Connection Management
//!
//! This module provides the core database connection and initialization
//! functionality using libsql for Arbor's node storage.
//!
//! # Architecture
//!
//! - **Path-agnostic**: Accepts any valid PathBuf; parent directories are
//!   created on demand
//! - **WAL mode**: Write-Ahead Logging for better concurrency
//! - **Foreign keys**: Enabled so every persisted parent reference points at
//!   an existing node row
//! - **Idempotent schema**: `CREATE TABLE IF NOT EXISTS`, safe across
//!   repeated process starts
//!
//! # Database Connection Patterns
//!
//! **Always use `connect_with_timeout()` in async functions.** SQLite
//! connections have thread-affinity requirements, and the Tokio runtime moves
//! futures between threads at `.await` points. The busy timeout makes
//! concurrent operations wait and retry instead of failing immediately with
//! `SQLITE_BUSY`.
//!
//! ```no_run
//! # use arbor_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db_service = DatabaseService::new(PathBuf::from("./data/arbor.db")).await?;
//! let conn = db_service.connect_with_timeout().await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::StoreError;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Database service for managing the libsql connection and schema
///
/// # Examples
///
/// ```no_run
/// use arbor_core::db::DatabaseService;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db_service = DatabaseService::new(PathBuf::from("./data/arbor.db")).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database connection (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

impl DatabaseService {
    /// Create a new DatabaseService with the specified database path
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Initialize the schema (CREATE TABLE IF NOT EXISTS)
    /// 4. Enable SQLite features (WAL mode, foreign keys, busy timeout)
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if:
    /// - Parent directory cannot be created
    /// - Database connection fails
    /// - Schema initialization fails
    pub async fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        // Check before opening so schema init can checkpoint only fresh files
        let is_new_database = !db_path.exists();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        StoreError::permission_denied(db_path.clone())
                    } else {
                        StoreError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| StoreError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema(is_new_database).await?;

        Ok(service)
    }

    /// Create an in-memory DatabaseService (primarily for tests)
    pub async fn new_in_memory() -> Result<Self, StoreError> {
        let db_path = PathBuf::from(":memory:");
        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| StoreError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        // In-memory databases have no WAL file to checkpoint
        service.initialize_schema(false).await?;

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so we must use query() instead of
    /// execute(). This helper encapsulates that pattern.
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), StoreError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            StoreError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            StoreError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize database schema and configuration
    ///
    /// Creates the nodes table and its parent index using CREATE ... IF NOT
    /// EXISTS, so initialization is idempotent and safe to run at every
    /// process start.
    ///
    /// # Schema
    ///
    /// - `nodes` table: store-assigned integer identity plus an optional
    ///   parent reference; the root is the row whose parent_id IS NULL
    /// - `idx_nodes_parent`: index used for root discovery at bootstrap
    async fn initialize_schema(&self, is_new_database: bool) -> Result<(), StoreError> {
        let conn = self.connect_with_timeout().await?;

        // WAL mode for better concurrency
        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        // Wait up to 5s on a locked database instead of failing immediately
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        // Parent references must point at existing rows
        self.execute_pragma(&conn, "PRAGMA foreign_keys = ON")
            .await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS nodes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_id INTEGER,
                FOREIGN KEY (parent_id) REFERENCES nodes(id)
            )",
            (),
        )
        .await
        .map_err(|e| StoreError::sql_execution(format!("Failed to create nodes table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_nodes_parent ON nodes(parent_id)",
            (),
        )
        .await
        .map_err(|e| {
            StoreError::sql_execution(format!("Failed to create index 'idx_nodes_parent': {}", e))
        })?;

        // Flush schema to disk for fresh databases so rapid reopen (common in
        // tests simulating restarts) never observes a missing table.
        if is_new_database {
            self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
                .await?;
        }

        Ok(())
    }

    /// Get a connection handle
    ///
    /// Only for synchronous contexts where the connection will not be used
    /// across `.await` points. Most code should use `connect_with_timeout()`.
    pub fn connect(&self) -> Result<libsql::Connection, StoreError> {
        self.db.connect().map_err(StoreError::LibsqlError)
    }

    /// Get an async connection with busy timeout configured
    ///
    /// The safe default for async contexts: sets a 5-second busy timeout so
    /// concurrent operations serialize gracefully when the Tokio runtime
    /// moves futures between threads.
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, StoreError> {
        // The synchronous connect() here only creates the handle; actual
        // SQLite operations happen later under the busy timeout.
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_initialization() {
        let db = DatabaseService::new_in_memory().await.unwrap();
        let conn = db.connect_with_timeout().await.unwrap();

        // Schema exists and is queryable
        let mut rows = conn
            .query("SELECT COUNT(*) FROM nodes", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        let count: i64 = row.get(0).unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_schema_initialization_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("arbor.db");

        let first = DatabaseService::new(db_path.clone()).await.unwrap();
        drop(first);

        // Re-opening the same file re-runs schema init without error
        let second = DatabaseService::new(db_path).await.unwrap();
        let conn = second.connect_with_timeout().await.unwrap();
        conn.execute("INSERT INTO nodes (parent_id) VALUES (NULL)", ())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_creates_missing_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("dir").join("arbor.db");

        DatabaseService::new(db_path.clone()).await.unwrap();
        assert!(db_path.exists());
    }
}
