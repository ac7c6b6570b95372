/*!
 * Document store access.
 *
 * - `ghost`: Ghost Admin API client
 * - `memory`: in-process store with the same version check, for tests and dry runs
 *
 * Every write carries the version stamp captured at read time; the store
 * rejects it with `StoreError::Conflict` when the document changed meanwhile.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::document::{Document, DocumentStatus, VersionStamp};
use crate::errors::StoreError;

pub mod ghost;
pub mod memory;

pub use ghost::GhostClient;
pub use memory::MemoryStore;

/// New body content for a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyUpdate {
    /// Serialized Lexical tree
    Lexical(String),
    /// Flat HTML, converted by the store
    Html(String),
}

impl BodyUpdate {
    /// Short name of the representation, for logs
    pub fn representation(&self) -> &'static str {
        match self {
            BodyUpdate::Lexical(_) => "lexical",
            BodyUpdate::Html(_) => "html",
        }
    }
}

/// Common trait for document stores
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// List documents, newest first
    ///
    /// # Arguments
    /// * `status` - Only return documents with this status; `None` for all
    /// * `limit` - Maximum number of documents
    async fn list_documents(
        &self,
        status: Option<DocumentStatus>,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError>;

    /// Read a single document with every body representation the store has
    async fn get_document(&self, id: &str) -> Result<Document, StoreError>;

    /// Replace a document's body, guarded by the version stamp read earlier
    async fn update_document(
        &self,
        id: &str,
        body: BodyUpdate,
        version: &VersionStamp,
    ) -> Result<Document, StoreError>;
}
