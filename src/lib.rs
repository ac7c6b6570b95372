/*!
 * # Proofreader - editorial review of Ghost drafts with AI
 *
 * A Rust library for reviewing a draft blog post: staged LLM analysis
 * produces suggestions, a human approves or rejects each one, and the
 * approved edits are written back to the document exactly once.
 *
 * ## Features
 *
 * - Style guidelines derived from recent published posts
 * - Typo, structure and coherence suggestions from:
 *   - Ollama (local LLM)
 *   - OpenAI API (and OpenAI-compatible servers such as LM Studio)
 *   - Anthropic API
 * - In-place patching of Lexical trees with a flat HTML fallback
 * - Optimistic-concurrency write guarded by the document's version stamp
 * - SQLite audit trail of sessions, suggestions and decisions
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Document model and Lexical tree handling
 * - `editorial`: The review core:
 *   - `editorial::pipeline`: Staged suggestion generation
 *   - `editorial::review`: Approve/reject state machine
 *   - `editorial::patcher`: Application of approved suggestions
 *   - `editorial::guard`: Version-checked single write
 * - `providers`: Completion clients (Ollama, OpenAI, Anthropic, mock)
 * - `store`: Document stores (Ghost Admin API, in-memory)
 * - `database` and `audit`: Audit persistence
 * - `app_controller`: Session controller for the CLI
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audit;
pub mod database;
pub mod document;
pub mod editorial;
pub mod errors;
pub mod providers;
pub mod store;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::{Document, DocumentBody, VersionStamp};
pub use editorial::{
    advance_review, apply_approved, ConflictGuard, EditorialPipeline, PatchResult, ReviewDecision,
    ReviewState, Suggestion,
};
pub use editorial::pipeline::run_pipeline;
pub use errors::{AppError, ApplyError, ProviderError, SchemaError, StoreError};
