/*!
 * Individual pipeline stages.
 *
 * Each stage is a function of the document and the guidelines derived so far,
 * plus the injected completion provider. Errors are returned to the
 * orchestrator, which decides how they affect the run.
 */

use log::{debug, info, warn};

use crate::document::{Document, DocumentStatus};
use crate::editorial::prompts;
use crate::editorial::schema;
use crate::editorial::suggestion::{Suggestion, SuggestionKind};
use crate::errors::StageError;
use crate::providers::{CompletionProvider, ResponseSchema};
use crate::store::DocumentStore;

/// Format documents as a style corpus, in the order given
pub fn format_corpus(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| format!("Title: {}\nContent:\n{}", d.title, d.body.analysis_text()))
        .collect::<Vec<_>>()
        .join(prompts::CORPUS_SEPARATOR)
}

/// Fetch the style corpus, if one can be had
///
/// Returns the number of documents and the formatted corpus. Any problem is
/// logged and yields `None`; the caller then falls back to the draft.
pub async fn load_corpus(store: Option<&dyn DocumentStore>, corpus_size: usize) -> Option<(usize, String)> {
    let Some(store) = store else {
        debug!("No document store configured; style analysis will use the draft");
        return None;
    };

    if corpus_size == 0 {
        return None;
    }

    match store
        .list_documents(Some(DocumentStatus::Published), corpus_size)
        .await
    {
        Ok(documents) if documents.is_empty() => {
            info!("No published posts available for style analysis; using the draft");
            None
        }
        Ok(documents) => Some((documents.len(), format_corpus(&documents))),
        Err(e) => {
            warn!("Failed to retrieve published posts for style analysis: {}", e);
            None
        }
    }
}

/// Derive style guidelines from the corpus, or from the draft when there is none
pub async fn derive_style(
    provider: &dyn CompletionProvider,
    document: &Document,
    corpus: Option<(usize, String)>,
) -> Result<String, StageError> {
    let user = match corpus {
        Some((count, corpus)) => prompts::style_from_corpus(count, &corpus),
        None => prompts::style_from_draft(document.body.analysis_text()),
    };

    let value = provider
        .complete(prompts::STYLE_SYSTEM, &user, ResponseSchema::Style)
        .await?;
    Ok(schema::decode_guidelines(value)?)
}

/// Run one analysis stage over the draft
pub async fn analyse(
    provider: &dyn CompletionProvider,
    kind: SuggestionKind,
    document: &Document,
    guidelines: &str,
) -> Result<Vec<Suggestion>, StageError> {
    let system = prompts::analysis_system(kind, guidelines);
    let user = prompts::analysis_user(kind, document.body.analysis_text());

    let value = provider
        .complete(&system, &user, ResponseSchema::Suggestions)
        .await?;
    Ok(schema::decode_suggestions(value)?)
}
