/*!
 * Database connection management.
 *
 * Opens the audit database, initializes its schema, and gives async code
 * access to the connection through tokio's spawn_blocking.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;

/// Shared handle on one SQLite connection
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    /// Backing file; `None` for an in-memory database
    db_path: Option<PathBuf>,
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open (or create) the database at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening audit database at: {:?}", db_path);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        Self::initialized(conn, Some(db_path))
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;

        Self::initialized(conn, None)
    }

    fn initialized(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        schema::initialize_schema(&conn)?;
        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Database file, if the database lives on disk
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run `f` with the connection on the current thread
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        f(&self.connection.lock())
    }

    /// Run `f` with the connection on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || f(&conn.lock()))
            .await
            .context("Database task panicked")?
    }

    /// Run `f` inside one transaction on the blocking pool; an error rolls
    /// everything back
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;
            Ok(result)
        })
        .await
        .context("Database transaction task panicked")?
    }

    /// Row counts and file size
    pub fn stats(&self) -> Result<DatabaseStats> {
        let file_size_bytes = self
            .path()
            .and_then(|path| std::fs::metadata(path).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        self.execute(|conn| {
            let count = |table: &str| -> Result<i64> {
                let sql = format!("SELECT COUNT(*) FROM {}", table);
                Ok(conn.query_row(&sql, [], |row| row.get(0))?)
            };

            Ok(DatabaseStats {
                session_count: count("sessions")?,
                suggestion_count: count("suggestions")?,
                decision_count: count("decisions")?,
                file_size_bytes,
            })
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    /// Number of review sessions
    pub session_count: i64,
    /// Number of recorded suggestions
    pub suggestion_count: i64,
    /// Number of recorded decisions
    pub decision_count: i64,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sessions: {}, Suggestions: {}, Decisions: {}, Size: {} KB",
            self.session_count,
            self.suggestion_count,
            self.decision_count,
            self.file_size_bytes / 1024
        )
    }
}
