/*!
 * Review state machine.
 *
 * Suggestions are presented one at a time, in pipeline order. Every decision
 * consumes the current state and yields the next one, so a decision can
 * never be revisited. The machine performs no I/O; abandoning it at any
 * point leaves everything external untouched.
 */

use std::collections::VecDeque;

use crate::editorial::suggestion::Suggestion;

/// Reviewer's verdict on one suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Keep the suggestion for patching
    Approve,
    /// Discard the suggestion
    Reject,
}

impl ReviewDecision {
    /// Lowercase identifier, as stored in the audit trail
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewDecision::Approve => "approve",
            ReviewDecision::Reject => "reject",
        }
    }
}

/// The suggestion currently under review
#[derive(Debug, Clone, Copy)]
pub struct ReviewItem<'a> {
    /// Suggestion to decide on
    pub suggestion: &'a Suggestion,
    /// 1-based position in the list
    pub position: usize,
    /// Number of suggestions in the list
    pub total: usize,
}

/// State of a review
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    /// Waiting for a decision on the front of `remaining`
    Presenting {
        /// Suggestions not yet decided, current first
        remaining: VecDeque<Suggestion>,
        /// Approved so far, in original order
        approved: Vec<Suggestion>,
        /// Size of the original list
        total: usize,
    },
    /// Every suggestion has been decided
    Done {
        /// Approved suggestions, in original order
        approved: Vec<Suggestion>,
    },
}

impl ReviewState {
    /// Start reviewing `suggestions`; an empty list is already done
    pub fn start(suggestions: Vec<Suggestion>) -> Self {
        if suggestions.is_empty() {
            return ReviewState::Done { approved: Vec::new() };
        }

        let total = suggestions.len();
        ReviewState::Presenting {
            remaining: suggestions.into(),
            approved: Vec::new(),
            total,
        }
    }

    /// Apply a decision to the current suggestion
    ///
    /// Advancing a finished review returns it unchanged.
    pub fn advance(self, decision: ReviewDecision) -> Self {
        match self {
            ReviewState::Presenting {
                mut remaining,
                mut approved,
                total,
            } => {
                if let Some(current) = remaining.pop_front() {
                    if decision == ReviewDecision::Approve {
                        approved.push(current);
                    }
                }

                if remaining.is_empty() {
                    ReviewState::Done { approved }
                } else {
                    ReviewState::Presenting {
                        remaining,
                        approved,
                        total,
                    }
                }
            }
            done @ ReviewState::Done { .. } => done,
        }
    }

    /// Suggestion awaiting a decision, if any
    pub fn current(&self) -> Option<ReviewItem<'_>> {
        match self {
            ReviewState::Presenting {
                remaining, total, ..
            } => remaining.front().map(|suggestion| ReviewItem {
                suggestion,
                position: total - remaining.len() + 1,
                total: *total,
            }),
            ReviewState::Done { .. } => None,
        }
    }

    /// Whether every suggestion has been decided
    pub fn is_done(&self) -> bool {
        matches!(self, ReviewState::Done { .. })
    }

    /// Suggestions approved so far
    pub fn approved(&self) -> &[Suggestion] {
        match self {
            ReviewState::Presenting { approved, .. } | ReviewState::Done { approved } => approved,
        }
    }

    /// Approved list of a finished review; `None` while still presenting
    pub fn into_approved(self) -> Option<Vec<Suggestion>> {
        match self {
            ReviewState::Done { approved } => Some(approved),
            ReviewState::Presenting { .. } => None,
        }
    }
}

/// Apply one decision; see [`ReviewState::advance`]
pub fn advance_review(state: ReviewState, decision: ReviewDecision) -> ReviewState {
    state.advance(decision)
}
