/*!
 * Audit trail of review sessions.
 *
 * Sinks never fail the session: a sink that cannot record something logs a
 * warning and carries on.
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::fmt::Debug;
use std::path::Path;

use crate::database::{DecisionRecord, Repository, SessionOutcome, SessionRecord, SuggestionRecord};
use crate::document::Document;
use crate::editorial::review::ReviewDecision;
use crate::editorial::suggestion::Suggestion;
use crate::errors::AppError;

/// Receiver of session events
#[async_trait]
pub trait AuditSink: Send + Sync + Debug {
    /// A session started on `document`
    async fn session_started(&self, session_id: &str, document: &Document, provider: &str, model: &str);

    /// The pipeline produced `suggestions`, in order
    async fn suggestions_recorded(&self, session_id: &str, suggestions: &[Suggestion]);

    /// The reviewer decided on the suggestion at 1-based `position`
    async fn decision_recorded(&self, session_id: &str, position: usize, decision: ReviewDecision);

    /// The session ended
    async fn session_finished(&self, session_id: &str, outcome: &SessionOutcome);
}

/// Sink that records nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

#[async_trait]
impl AuditSink for NullAuditSink {
    async fn session_started(&self, session_id: &str, _document: &Document, _provider: &str, _model: &str) {
        debug!("Audit disabled; session {} not recorded", session_id);
    }

    async fn suggestions_recorded(&self, _session_id: &str, _suggestions: &[Suggestion]) {}

    async fn decision_recorded(&self, _session_id: &str, _position: usize, _decision: ReviewDecision) {}

    async fn session_finished(&self, _session_id: &str, _outcome: &SessionOutcome) {}
}

/// Sink backed by the SQLite audit database
#[derive(Debug, Clone)]
pub struct SqliteAuditSink {
    repository: Repository,
}

impl SqliteAuditSink {
    /// Open the audit database at `path`, creating it if needed
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let repository = Repository::open(path).map_err(|e| AppError::Audit(e.to_string()))?;
        Ok(Self { repository })
    }

    /// Sink over an in-memory database
    pub fn in_memory() -> Result<Self, AppError> {
        let repository = Repository::new_in_memory().map_err(|e| AppError::Audit(e.to_string()))?;
        Ok(Self { repository })
    }

    /// Repository for reading the trail back
    pub fn repository(&self) -> &Repository {
        &self.repository
    }
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
    async fn session_started(&self, session_id: &str, document: &Document, provider: &str, model: &str) {
        let record = SessionRecord::new(
            session_id.to_string(),
            document.id.clone(),
            document.title.clone(),
            document.updated_at.to_string(),
            provider.to_string(),
            model.to_string(),
        );

        if let Err(e) = self.repository.create_session(&record).await {
            warn!("Could not record session {}: {}", session_id, e);
        }
    }

    async fn suggestions_recorded(&self, session_id: &str, suggestions: &[Suggestion]) {
        let records = suggestions
            .iter()
            .enumerate()
            .map(|(index, suggestion)| {
                SuggestionRecord::from_suggestion(session_id, index as i64 + 1, suggestion)
            })
            .collect();

        if let Err(e) = self.repository.insert_suggestions(session_id, records).await {
            warn!("Could not record suggestions of session {}: {}", session_id, e);
        }
    }

    async fn decision_recorded(&self, session_id: &str, position: usize, decision: ReviewDecision) {
        let record = DecisionRecord::new(session_id, position as i64, decision.as_str());

        if let Err(e) = self.repository.insert_decision(&record).await {
            warn!("Could not record decision {} of session {}: {}", position, session_id, e);
        }
    }

    async fn session_finished(&self, session_id: &str, outcome: &SessionOutcome) {
        if let Err(e) = self.repository.finish_session(session_id, outcome).await {
            warn!("Could not record outcome of session {}: {}", session_id, e);
        }
    }
}
