/*!
 * Database schema definitions and versioning.
 *
 * Three tables hold the audit trail of review sessions:
 * - `sessions`: one row per reviewed draft, with its final outcome
 * - `suggestions`: every suggestion the pipeline produced, in order
 * - `decisions`: the reviewer's verdict on each presented suggestion
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version, stored in SQLite's `user_version`
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    match schema_version(conn)? {
        0 => {
            info!("Initializing audit schema v{}", SCHEMA_VERSION);
            create_all_tables(conn)?;
            set_schema_version(conn, SCHEMA_VERSION)
        }
        SCHEMA_VERSION => {
            debug!("Audit schema is up to date (v{})", SCHEMA_VERSION);
            Ok(())
        }
        other => Err(anyhow!(
            "Audit database has schema v{}, this build supports v{}",
            other,
            SCHEMA_VERSION
        )),
    }
}

fn schema_version(conn: &Connection) -> Result<i32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("Failed to read audit schema version")
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.pragma_update(None, "user_version", version)
        .context("Failed to record audit schema version")
}

/// Create all database tables
fn create_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            document_title TEXT NOT NULL,
            version_stamp TEXT NOT NULL,
            provider TEXT NOT NULL,
            model TEXT NOT NULL,
            suggestion_count INTEGER DEFAULT 0,
            approved_count INTEGER DEFAULT 0,
            applied_count INTEGER DEFAULT 0,
            status TEXT DEFAULT 'in_progress',
            detail TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            completed_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_document ON sessions(document_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_status ON sessions(status);
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS suggestions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            seq_num INTEGER NOT NULL,
            kind TEXT NOT NULL,
            location TEXT NOT NULL,
            original_text TEXT NOT NULL,
            proposed_text TEXT NOT NULL,
            reasoning TEXT NOT NULL,
            UNIQUE(session_id, seq_num)
        );

        CREATE INDEX IF NOT EXISTS idx_suggestions_session ON suggestions(session_id);
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS decisions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            seq_num INTEGER NOT NULL,
            decision TEXT NOT NULL,
            decided_at TEXT NOT NULL,
            UNIQUE(session_id, seq_num)
        );

        CREATE INDEX IF NOT EXISTS idx_decisions_session ON decisions(session_id);
        "#,
    )?;

    info!("Audit schema created successfully");
    Ok(())
}
