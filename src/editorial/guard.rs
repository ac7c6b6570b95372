/*!
 * Optimistic-concurrency guard for the final write.
 *
 * The guard captures the version stamp when the document is read. The one
 * write of a session carries that stamp, and the store refuses it if the
 * document changed since. `apply` consumes the guard, so a session cannot
 * write twice.
 */

use log::{info, warn};

use crate::document::{Document, VersionStamp};
use crate::editorial::patcher::PatchedBody;
use crate::errors::ApplyError;
use crate::store::{BodyUpdate, DocumentStore};

/// Version stamp of a document, held until the single write
#[derive(Debug)]
pub struct ConflictGuard {
    document_id: String,
    version: VersionStamp,
}

impl ConflictGuard {
    /// Capture the stamp of `document` as read
    pub fn capture(document: &Document) -> Self {
        Self {
            document_id: document.id.clone(),
            version: document.updated_at.clone(),
        }
    }

    /// Document the guard protects
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Captured stamp
    pub fn version(&self) -> &VersionStamp {
        &self.version
    }

    /// Write `body` back if the document is unchanged since capture
    ///
    /// # Errors
    /// * `ApplyError::Conflict` - the document was modified in the meantime
    /// * `ApplyError::Transport` - any other store failure
    pub async fn apply(
        self,
        store: &dyn DocumentStore,
        body: PatchedBody,
    ) -> Result<Document, ApplyError> {
        let update = BodyUpdate::from(body);
        info!(
            "Writing {} body of {} (version {})",
            update.representation(),
            self.document_id,
            self.version
        );

        match store.update_document(&self.document_id, update, &self.version).await {
            Ok(document) => {
                info!("Saved {}; new version {}", document.id, document.updated_at);
                Ok(document)
            }
            Err(e) => {
                let error = ApplyError::from(e);
                warn!("Write of {} rejected: {}", self.document_id, error);
                Err(error)
            }
        }
    }
}
