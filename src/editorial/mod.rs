/*!
 * Editorial review of a draft.
 *
 * - `pipeline`: staged generation of suggestions
 * - `review`: one-at-a-time approve/reject state machine
 * - `patcher`: application of approved suggestions to the body
 * - `guard`: the single version-checked write
 * - `suggestion`, `schema`, `prompts`: shared types, result decoding, prompt text
 */

pub mod guard;
pub mod patcher;
pub mod pipeline;
pub mod prompts;
pub mod review;
pub mod schema;
pub mod suggestion;

pub use guard::ConflictGuard;
pub use patcher::{
    apply_approved, Degradation, PatchResult, PatchStrategy, PatchedBody, Patcher, TreeStrategy,
    UnmatchedSuggestion,
};
pub use pipeline::{EditorialPipeline, PipelineConfig, PipelineProgress, PipelineResult, Stage};
pub use review::{advance_review, ReviewDecision, ReviewItem, ReviewState};
pub use suggestion::{Suggestion, SuggestionKind};
