/*!
 * Tests for the review state machine
 */

use proofreader::editorial::{advance_review, ReviewDecision, ReviewState, Suggestion, SuggestionKind};

fn suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion::new(SuggestionKind::Typo, "teh", "the"),
        Suggestion::new(SuggestionKind::Structure, "Intro.", "Introduction."),
        Suggestion::new(SuggestionKind::Coherence, "It", "The release"),
    ]
}

/// Test that approved suggestions keep their original order
#[test]
fn test_review_withMixedDecisions_shouldKeepApprovedInOrder() {
    let decisions = [ReviewDecision::Approve, ReviewDecision::Reject, ReviewDecision::Approve];

    let state = decisions
        .into_iter()
        .fold(ReviewState::start(suggestions()), advance_review);

    assert!(state.is_done());
    let approved = state.into_approved().unwrap();
    assert_eq!(approved.len(), 2);
    assert_eq!(approved[0].original_text, "teh");
    assert_eq!(approved[1].original_text, "It");
}

/// Test that each suggestion is presented once, with its position
#[test]
fn test_review_current_shouldPresentEachSuggestionOnce() {
    let mut state = ReviewState::start(suggestions());
    let mut seen = Vec::new();

    while let Some(item) = state.current() {
        seen.push((item.position, item.total, item.suggestion.kind));
        state = advance_review(state, ReviewDecision::Reject);
    }

    assert_eq!(
        seen,
        vec![
            (1, 3, SuggestionKind::Typo),
            (2, 3, SuggestionKind::Structure),
            (3, 3, SuggestionKind::Coherence),
        ]
    );
    assert_eq!(state.into_approved(), Some(Vec::new()));
}

/// Test that an abandoned review yields nothing to apply
#[test]
fn test_review_abandonedMidway_shouldHaveNoFinalList() {
    let state = advance_review(ReviewState::start(suggestions()), ReviewDecision::Approve);

    assert!(!state.is_done());
    assert_eq!(state.approved().len(), 1);
    assert_eq!(state.into_approved(), None);
}

/// Test that decisions after completion change nothing
#[test]
fn test_review_advanceWhenDone_shouldBeNoOp() {
    let done = ReviewState::start(vec![Suggestion::new(SuggestionKind::Typo, "a", "b")])
        .advance(ReviewDecision::Approve);
    let again = advance_review(done.clone(), ReviewDecision::Reject);

    assert_eq!(done, again);
}

/// Test that an empty list needs no decisions
#[test]
fn test_review_withNoSuggestions_shouldStartDone() {
    let state = ReviewState::start(Vec::new());

    assert!(state.current().is_none());
    assert_eq!(state.into_approved(), Some(Vec::new()));
}
