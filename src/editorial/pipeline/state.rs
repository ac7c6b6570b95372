use std::fmt;

use crate::document::Document;
use crate::editorial::suggestion::{Suggestion, SuggestionKind};

/// Stages of the editorial pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Style guideline derivation
    Style,
    /// Spelling and grammar
    Typo,
    /// Organisation of the text
    Structure,
    /// Logical flow
    Coherence,
}

impl Stage {
    /// Every stage, in the order they run
    pub const ORDER: [Stage; 4] = [Stage::Style, Stage::Typo, Stage::Structure, Stage::Coherence];

    /// Suggestion kind produced by an analysis stage
    pub fn suggestion_kind(&self) -> Option<SuggestionKind> {
        match self {
            Stage::Style => None,
            Stage::Typo => Some(SuggestionKind::Typo),
            Stage::Structure => Some(SuggestionKind::Structure),
            Stage::Coherence => Some(SuggestionKind::Coherence),
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Style => "style analysis",
            Stage::Typo => "typo check",
            Stage::Structure => "structure review",
            Stage::Coherence => "coherence check",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stage that contributed nothing because it failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    /// Which stage
    pub stage: Stage,
    /// Error message
    pub message: String,
}

/// Accumulator threaded through the stages of one run.
///
/// Only the orchestrator mutates it; stages see the document and the
/// guidelines, never each other's suggestions.
#[derive(Debug)]
pub struct PipelineState<'a> {
    document: &'a Document,
    guidelines: Option<String>,
    suggestions: Vec<Suggestion>,
    failures: Vec<StageFailure>,
    error: Option<String>,
}

/// Everything a finished run accumulated
#[derive(Debug)]
pub struct StateParts {
    pub guidelines: Option<String>,
    pub suggestions: Vec<Suggestion>,
    pub failures: Vec<StageFailure>,
    pub error: Option<String>,
}

impl<'a> PipelineState<'a> {
    /// Fresh state for `document`
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            guidelines: None,
            suggestions: Vec::new(),
            failures: Vec::new(),
            error: None,
        }
    }

    /// Document under review
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// Guidelines so far; empty when the style stage produced none
    pub fn guidelines(&self) -> &str {
        self.guidelines.as_deref().unwrap_or_default()
    }

    /// Record the style stage output
    pub fn set_guidelines(&mut self, guidelines: String) {
        self.guidelines = Some(guidelines);
    }

    /// Append a stage's suggestions, keeping their order
    pub fn extend_suggestions(&mut self, suggestions: Vec<Suggestion>) {
        self.suggestions.extend(suggestions);
    }

    /// Record a failed stage
    pub fn record_failure(&mut self, stage: Stage, message: String) {
        self.failures.push(StageFailure { stage, message });
    }

    /// Suggestions accumulated so far
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Mark the run as having produced no usable analysis when every
    /// analysis stage failed
    pub fn settle(&mut self) {
        let all_failed = Stage::ORDER
            .iter()
            .filter(|stage| stage.suggestion_kind().is_some())
            .all(|stage| self.failures.iter().any(|f| f.stage == *stage));

        if all_failed {
            self.error = self
                .failures
                .last()
                .map(|f| format!("No analysis stage completed; last error: {}", f.message));
        }
    }

    /// Terminal error of the run, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Consume the state
    pub fn into_parts(self) -> StateParts {
        StateParts {
            guidelines: self.guidelines,
            suggestions: self.suggestions,
            failures: self.failures,
            error: self.error,
        }
    }
}
