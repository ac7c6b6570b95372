/*!
 * SQLite persistence for the review audit trail.
 *
 * - `schema`: tables and schema versioning
 * - `connection`: connection handling on the blocking pool
 * - `models`: row types
 * - `repository`: typed queries
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{DecisionRecord, SessionOutcome, SessionRecord, SessionStatus, SuggestionRecord};
pub use repository::Repository;
