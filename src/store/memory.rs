use async_trait::async_trait;
use parking_lot::Mutex;

use crate::document::{Document, DocumentBody, DocumentStatus, VersionStamp};
use crate::errors::StoreError;
use crate::store::{BodyUpdate, DocumentStore};

/// In-memory document store
///
/// Enforces the same version check as a remote store and issues a fresh
/// stamp on every accepted write. Writes are recorded for inspection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<Document>>,
    writes: Mutex<Vec<(String, BodyUpdate)>>,
    revision: Mutex<u64>,
}

impl MemoryStore {
    /// Create a store holding `documents`, listed in the given order
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: Mutex::new(documents),
            ..Default::default()
        }
    }

    /// Add or replace a document
    pub fn insert(&self, document: Document) {
        let mut documents = self.documents.lock();
        match documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
    }

    /// Simulate an edit made elsewhere: bump the stamp without touching the body
    pub fn touch(&self, id: &str) -> Option<VersionStamp> {
        let stamp = self.next_stamp();
        let mut documents = self.documents.lock();
        let document = documents.iter_mut().find(|d| d.id == id)?;
        document.updated_at = stamp.clone();
        Some(stamp)
    }

    /// Every accepted write, in order
    pub fn writes(&self) -> Vec<(String, BodyUpdate)> {
        self.writes.lock().clone()
    }

    /// Current copy of a document
    pub fn snapshot(&self, id: &str) -> Option<Document> {
        self.documents.lock().iter().find(|d| d.id == id).cloned()
    }

    fn next_stamp(&self) -> VersionStamp {
        let mut revision = self.revision.lock();
        *revision += 1;
        VersionStamp::new(format!("memory-rev-{}", *revision))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(
        &self,
        status: Option<DocumentStatus>,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .documents
            .lock()
            .iter()
            .filter(|d| status.is_none_or(|s| d.status == s))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_document(&self, id: &str) -> Result<Document, StoreError> {
        self.snapshot(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update_document(
        &self,
        id: &str,
        body: BodyUpdate,
        version: &VersionStamp,
    ) -> Result<Document, StoreError> {
        let stamp = self.next_stamp();
        let mut documents = self.documents.lock();
        let document = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if &document.updated_at != version {
            return Err(StoreError::Conflict {
                document_id: id.to_string(),
                message: format!(
                    "stored version {} does not match {}",
                    document.updated_at, version
                ),
            });
        }

        document.body = match &body {
            BodyUpdate::Lexical(lexical) => DocumentBody::Tree {
                lexical: lexical.clone(),
                html: None,
            },
            BodyUpdate::Html(html) => DocumentBody::Flat { html: html.clone() },
        };
        document.updated_at = stamp;
        let updated = document.clone();
        drop(documents);

        self.writes.lock().push((id.to_string(), body));
        Ok(updated)
    }
}
