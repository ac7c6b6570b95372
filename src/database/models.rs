/*!
 * Database entity models.
 *
 * These structures map directly to the audit tables.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::editorial::suggestion::Suggestion;

/// Outcome of a review session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Pipeline or review still running
    InProgress,
    /// Patched body was written back
    Applied,
    /// Nothing approved or nothing matched; no write
    Unchanged,
    /// Patched but not written (dry run)
    DryRun,
    /// Reviewer declined the final write
    Cancelled,
    /// Store rejected the write as stale
    Conflict,
    /// Unrecoverable error
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::InProgress => write!(f, "in_progress"),
            SessionStatus::Applied => write!(f, "applied"),
            SessionStatus::Unchanged => write!(f, "unchanged"),
            SessionStatus::DryRun => write!(f, "dry_run"),
            SessionStatus::Cancelled => write!(f, "cancelled"),
            SessionStatus::Conflict => write!(f, "conflict"),
            SessionStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_progress" => Ok(SessionStatus::InProgress),
            "applied" => Ok(SessionStatus::Applied),
            "unchanged" => Ok(SessionStatus::Unchanged),
            "dry_run" => Ok(SessionStatus::DryRun),
            "cancelled" => Ok(SessionStatus::Cancelled),
            "conflict" => Ok(SessionStatus::Conflict),
            "failed" => Ok(SessionStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid session status: {}", s)),
        }
    }
}

/// Review session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session identifier (UUID)
    pub id: String,
    /// Reviewed document
    pub document_id: String,
    /// Title at read time
    pub document_title: String,
    /// Version stamp at read time
    pub version_stamp: String,
    /// Completion provider used
    pub provider: String,
    /// Model used
    pub model: String,
    /// Suggestions produced by the pipeline
    pub suggestion_count: i64,
    /// Suggestions approved by the reviewer
    pub approved_count: i64,
    /// Suggestions applied to the body
    pub applied_count: i64,
    /// Current status
    pub status: SessionStatus,
    /// Free-form detail about the outcome (conflict message, error)
    pub detail: Option<String>,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
    /// Completion timestamp (ISO 8601), once finished
    pub completed_at: Option<String>,
}

impl SessionRecord {
    /// Create a new in-progress session record
    pub fn new(
        id: String,
        document_id: String,
        document_title: String,
        version_stamp: String,
        provider: String,
        model: String,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id,
            document_id,
            document_title,
            version_stamp,
            provider,
            model,
            suggestion_count: 0,
            approved_count: 0,
            applied_count: 0,
            status: SessionStatus::InProgress,
            detail: None,
            created_at: now.clone(),
            updated_at: now,
            completed_at: None,
        }
    }
}

/// One suggestion produced during a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    /// Database ID (auto-generated)
    pub id: Option<i64>,
    /// Parent session ID
    pub session_id: String,
    /// 1-based position in the pipeline output
    pub seq_num: i64,
    /// Suggestion kind (typo, structure, coherence)
    pub kind: String,
    /// Location hint
    pub location: String,
    /// Fragment to replace
    pub original_text: String,
    /// Replacement
    pub proposed_text: String,
    /// Reasoning
    pub reasoning: String,
}

impl SuggestionRecord {
    /// Build the record for the `seq_num`-th suggestion of a session
    pub fn from_suggestion(session_id: &str, seq_num: i64, suggestion: &Suggestion) -> Self {
        Self {
            id: None,
            session_id: session_id.to_string(),
            seq_num,
            kind: suggestion.kind.to_string(),
            location: suggestion.location.clone(),
            original_text: suggestion.original_text.clone(),
            proposed_text: suggestion.proposed_text.clone(),
            reasoning: suggestion.reasoning.clone(),
        }
    }
}

/// Reviewer's verdict on one suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Parent session ID
    pub session_id: String,
    /// Position of the decided suggestion
    pub seq_num: i64,
    /// "approve" or "reject"
    pub decision: String,
    /// Decision timestamp (ISO 8601)
    pub decided_at: String,
}

impl DecisionRecord {
    /// Create a decision stamped now
    pub fn new(session_id: &str, seq_num: i64, decision: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            seq_num,
            decision: decision.to_string(),
            decided_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Final figures of a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    /// Final status
    pub status: SessionStatus,
    /// Suggestions approved
    pub approved: usize,
    /// Suggestions applied
    pub applied: usize,
    /// Extra detail, e.g. the conflict message
    pub detail: Option<String>,
}

impl SessionOutcome {
    /// Outcome with no detail
    pub fn new(status: SessionStatus, approved: usize, applied: usize) -> Self {
        Self {
            status,
            approved,
            applied,
            detail: None,
        }
    }

    /// Attach a detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
