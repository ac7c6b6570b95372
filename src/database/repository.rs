/*!
 * Repository layer for audit operations.
 *
 * High-level, type-safe access to the audit tables; the SQL stays here.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, OptionalExtension};
use std::path::Path;

use super::connection::DatabaseConnection;
use super::models::{DecisionRecord, SessionOutcome, SessionRecord, SessionStatus, SuggestionRecord};

const SESSION_COLUMNS: &str = "id, document_id, document_title, version_stamp, provider, model, \
     suggestion_count, approved_count, applied_count, status, detail, \
     created_at, updated_at, completed_at";

/// Repository for audit operations
#[derive(Debug, Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new(path)?))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Create a new review session
    pub async fn create_session(&self, session: &SessionRecord) -> Result<()> {
        let session = session.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO sessions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                        SESSION_COLUMNS
                    ),
                    params![
                        session.id,
                        session.document_id,
                        session.document_title,
                        session.version_stamp,
                        session.provider,
                        session.model,
                        session.suggestion_count,
                        session.approved_count,
                        session.applied_count,
                        session.status.to_string(),
                        session.detail,
                        session.created_at,
                        session.updated_at,
                        session.completed_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get a session by ID
    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let session_id = session_id.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        &format!("SELECT {} FROM sessions WHERE id = ?1", SESSION_COLUMNS),
                        [&session_id],
                        parse_session_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// List the most recent sessions, optionally for one document
    pub async fn list_sessions(
        &self,
        document_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SessionRecord>> {
        let document_id = document_id.map(str::to_string);
        let limit = limit as i64;

        self.db
            .execute_async(move |conn| {
                let sessions: Vec<SessionRecord> = match document_id {
                    Some(document_id) => {
                        let mut stmt = conn.prepare(&format!(
                            "SELECT {} FROM sessions WHERE document_id = ?1 ORDER BY created_at DESC LIMIT ?2",
                            SESSION_COLUMNS
                        ))?;
                        stmt.query_map(params![document_id, limit], parse_session_row)?
                            .filter_map(|r| r.ok())
                            .collect()
                    }
                    None => {
                        let mut stmt = conn.prepare(&format!(
                            "SELECT {} FROM sessions ORDER BY created_at DESC LIMIT ?1",
                            SESSION_COLUMNS
                        ))?;
                        stmt.query_map([limit], parse_session_row)?
                            .filter_map(|r| r.ok())
                            .collect()
                    }
                };

                Ok(sessions)
            })
            .await
    }

    /// Record the final outcome of a session
    pub async fn finish_session(&self, session_id: &str, outcome: &SessionOutcome) -> Result<()> {
        let session_id = session_id.to_string();
        let outcome = outcome.clone();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .execute_async(move |conn| {
                let completed_at = if outcome.status == SessionStatus::InProgress {
                    None
                } else {
                    Some(now.clone())
                };

                conn.execute(
                    r#"
                    UPDATE sessions
                    SET status = ?1, approved_count = ?2, applied_count = ?3, detail = ?4,
                        updated_at = ?5, completed_at = COALESCE(?6, completed_at)
                    WHERE id = ?7
                    "#,
                    params![
                        outcome.status.to_string(),
                        outcome.approved as i64,
                        outcome.applied as i64,
                        outcome.detail,
                        now,
                        completed_at,
                        session_id
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Delete a session and its suggestions and decisions
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let session_id = session_id.to_string();

        self.db
            .execute_async(move |conn| {
                conn.execute("DELETE FROM sessions WHERE id = ?1", [&session_id])?;
                Ok(())
            })
            .await
    }

    // =========================================================================
    // Suggestion Operations
    // =========================================================================

    /// Insert the suggestions of a session and update its suggestion count
    pub async fn insert_suggestions(
        &self,
        session_id: &str,
        suggestions: Vec<SuggestionRecord>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        debug!("Recording {} suggestion(s) for session {}", suggestions.len(), session_id);

        self.db
            .transaction_async(move |tx| {
                for suggestion in &suggestions {
                    tx.execute(
                        r#"
                        INSERT INTO suggestions (session_id, seq_num, kind, location, original_text, proposed_text, reasoning)
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                        "#,
                        params![
                            suggestion.session_id,
                            suggestion.seq_num,
                            suggestion.kind,
                            suggestion.location,
                            suggestion.original_text,
                            suggestion.proposed_text,
                            suggestion.reasoning,
                        ],
                    )?;
                }

                tx.execute(
                    r#"
                    UPDATE sessions
                    SET suggestion_count = (SELECT COUNT(*) FROM suggestions WHERE session_id = ?1),
                        updated_at = ?2
                    WHERE id = ?1
                    "#,
                    params![session_id, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
    }

    /// Get the suggestions of a session, in order
    pub async fn get_suggestions(&self, session_id: &str) -> Result<Vec<SuggestionRecord>> {
        let session_id = session_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, session_id, seq_num, kind, location, original_text, proposed_text, reasoning
                    FROM suggestions
                    WHERE session_id = ?1
                    ORDER BY seq_num
                    "#,
                )?;

                let rows = stmt.query_map([&session_id], |row| {
                    Ok(SuggestionRecord {
                        id: row.get(0)?,
                        session_id: row.get(1)?,
                        seq_num: row.get(2)?,
                        kind: row.get(3)?,
                        location: row.get(4)?,
                        original_text: row.get(5)?,
                        proposed_text: row.get(6)?,
                        reasoning: row.get(7)?,
                    })
                })?;

                Ok(rows.filter_map(|r| r.ok()).collect())
            })
            .await
    }

    // =========================================================================
    // Decision Operations
    // =========================================================================

    /// Record one decision
    pub async fn insert_decision(&self, decision: &DecisionRecord) -> Result<()> {
        let decision = decision.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO decisions (session_id, seq_num, decision, decided_at)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                    params![
                        decision.session_id,
                        decision.seq_num,
                        decision.decision,
                        decision.decided_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get the decisions of a session, in order
    pub async fn get_decisions(&self, session_id: &str) -> Result<Vec<DecisionRecord>> {
        let session_id = session_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT session_id, seq_num, decision, decided_at
                    FROM decisions
                    WHERE session_id = ?1
                    ORDER BY seq_num
                    "#,
                )?;

                let rows = stmt.query_map([&session_id], |row| {
                    Ok(DecisionRecord {
                        session_id: row.get(0)?,
                        seq_num: row.get(1)?,
                        decision: row.get(2)?,
                        decided_at: row.get(3)?,
                    })
                })?;

                Ok(rows.filter_map(|r| r.ok()).collect())
            })
            .await
    }
}

fn parse_session_row(row: &rusqlite::Row) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        id: row.get(0)?,
        document_id: row.get(1)?,
        document_title: row.get(2)?,
        version_stamp: row.get(3)?,
        provider: row.get(4)?,
        model: row.get(5)?,
        suggestion_count: row.get(6)?,
        approved_count: row.get(7)?,
        applied_count: row.get(8)?,
        status: row
            .get::<_, String>(9)?
            .parse()
            .unwrap_or(SessionStatus::InProgress),
        detail: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
        completed_at: row.get(13)?,
    })
}
