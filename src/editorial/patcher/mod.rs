/*!
 * Document patcher.
 *
 * Applies approved suggestions to a document body:
 * - `tree`: substitution inside the text leaves of a Lexical tree
 * - `rewrite`: the provider rewrites the whole tree serialization
 * - `flat`: first-occurrence replacement on the flat HTML
 *
 * The tree body is preferred. The flat body is used when there is no tree,
 * when the tree does not parse, or when tree patching fails; each fallback is
 * reported in `PatchResult::degradations`.
 */

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::document::{Document, DocumentBody, LexicalTree};
use crate::editorial::suggestion::Suggestion;
use crate::errors::TreeError;
use crate::providers::CompletionProvider;
use crate::store::BodyUpdate;

pub mod flat;
pub mod rewrite;
pub mod tree;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// How approved suggestions are applied to a tree body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeStrategy {
    /// Substitute inside text leaves
    #[default]
    Splice,
    /// Have the completion provider rewrite the serialization
    Rewrite,
}

impl fmt::Display for TreeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeStrategy::Splice => write!(f, "splice"),
            TreeStrategy::Rewrite => write!(f, "rewrite"),
        }
    }
}

/// Path that produced a patched body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStrategy {
    /// Leaf substitution on the tree
    Splice,
    /// Provider rewrite of the tree
    Rewrite,
    /// Substitution on flat text
    Flat,
}

impl fmt::Display for PatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchStrategy::Splice => write!(f, "tree splice"),
            PatchStrategy::Rewrite => write!(f, "tree rewrite"),
            PatchStrategy::Flat => write!(f, "flat text"),
        }
    }
}

/// Patched body, in the representation it must be written back as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchedBody {
    /// Serialized Lexical tree
    Tree(String),
    /// Flat HTML
    Flat(String),
}

impl PatchedBody {
    /// Raw content
    pub fn as_str(&self) -> &str {
        match self {
            PatchedBody::Tree(s) | PatchedBody::Flat(s) => s,
        }
    }

    /// Content for display: a pretty-printed tree, or the HTML as is
    pub fn rendered(&self) -> String {
        match self {
            PatchedBody::Tree(raw) => serde_json::from_str::<serde_json::Value>(raw)
                .and_then(|value| serde_json::to_string_pretty(&value))
                .unwrap_or_else(|_| raw.clone()),
            PatchedBody::Flat(html) => html.clone(),
        }
    }

    /// Text a reader would see
    pub fn visible_text(&self) -> String {
        match self {
            PatchedBody::Tree(raw) => tree_text(raw),
            PatchedBody::Flat(html) => strip_markup(html),
        }
    }
}

impl From<PatchedBody> for BodyUpdate {
    fn from(body: PatchedBody) -> Self {
        match body {
            PatchedBody::Tree(lexical) => BodyUpdate::Lexical(lexical),
            PatchedBody::Flat(html) => BodyUpdate::Html(html),
        }
    }
}

/// A suggestion whose fragment was not found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedSuggestion {
    /// Short excerpt of the fragment, for display
    pub excerpt: String,
    /// The suggestion itself
    pub suggestion: Suggestion,
}

impl From<&Suggestion> for UnmatchedSuggestion {
    fn from(suggestion: &Suggestion) -> Self {
        Self {
            excerpt: suggestion.excerpt(),
            suggestion: suggestion.clone(),
        }
    }
}

/// Reason the patcher fell back to flat text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// The document has no tree body
    NoTree {
        /// Representation the document does have
        representation: &'static str,
    },
    /// The tree body did not parse
    TreeParse(String),
    /// The patched tree could not be serialized
    TreeStructure(String),
    /// The provider rewrite failed
    RewriteFailed(String),
}

impl From<TreeError> for Degradation {
    fn from(error: TreeError) -> Self {
        match error {
            TreeError::Parse(message) => Degradation::TreeParse(message),
            TreeError::Structural(message) => Degradation::TreeStructure(message),
        }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::NoTree { representation } => {
                write!(f, "no tree body ({} only), patched flat text", representation)
            }
            Degradation::TreeParse(m) => write!(f, "tree body did not parse ({}), patched flat text", m),
            Degradation::TreeStructure(m) => {
                write!(f, "tree patch failed ({}), patched flat text", m)
            }
            Degradation::RewriteFailed(m) => {
                write!(f, "tree rewrite failed ({}), patched flat text", m)
            }
        }
    }
}

/// Outcome of patching a document
#[derive(Debug, Clone)]
pub struct PatchResult {
    /// New body
    pub body: PatchedBody,
    /// Number of suggestions applied
    pub applied: usize,
    /// Suggestions whose fragment was not found
    pub unmatched: Vec<UnmatchedSuggestion>,
    /// Fallbacks taken, in order
    pub degradations: Vec<Degradation>,
    /// Path that produced `body`
    pub strategy: PatchStrategy,
}

impl PatchResult {
    /// Whether the body differs from the input
    pub fn has_changes(&self) -> bool {
        self.applied > 0
    }

    /// Whether a fallback was taken
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    /// Visible text of `original` in the representation the patch targets
    pub fn original_text(&self, original: &DocumentBody) -> String {
        match (&self.body, original) {
            (PatchedBody::Tree(_), DocumentBody::Tree { lexical, .. }) => tree_text(lexical),
            _ => original.html().map(strip_markup).unwrap_or_default(),
        }
    }

    /// Fraction of the original visible text removed by the patch, 0.0 when
    /// the text grew or stayed the same
    ///
    /// A tree that no longer parses counts as fully removed.
    pub fn shrink_ratio(&self, original: &DocumentBody) -> f64 {
        if let PatchedBody::Tree(raw) = &self.body {
            if let Err(e) = LexicalTree::parse(raw) {
                warn!("Patched tree does not parse: {}", e);
                return 1.0;
            }
        }

        let before = self.original_text(original).chars().count();
        if before == 0 {
            return 0.0;
        }

        let after = self.body.visible_text().chars().count();
        before.saturating_sub(after) as f64 / before as f64
    }

    fn unchanged(body: PatchedBody, strategy: PatchStrategy) -> Self {
        Self {
            body,
            applied: 0,
            unmatched: Vec::new(),
            degradations: Vec::new(),
            strategy,
        }
    }
}

/// Text produced by one substitution pass
#[derive(Debug, Clone)]
pub struct TextPatch {
    /// Patched content
    pub body: String,
    /// Number of suggestions applied
    pub applied: usize,
    /// Suggestions not found
    pub unmatched: Vec<UnmatchedSuggestion>,
}

/// Apply approved suggestions to `document` with leaf substitution
///
/// An empty list returns the body unchanged.
pub fn apply_approved(document: &Document, approved: &[Suggestion]) -> PatchResult {
    match &document.body {
        DocumentBody::Tree { lexical, html } => {
            if approved.is_empty() {
                return PatchResult::unchanged(PatchedBody::Tree(lexical.clone()), PatchStrategy::Splice);
            }
            match tree::splice(lexical, approved) {
                Ok(patch) => {
                    debug!(
                        "Tree splice applied {}/{} suggestion(s)",
                        patch.applied,
                        approved.len()
                    );
                    PatchResult {
                        body: PatchedBody::Tree(patch.body),
                        applied: patch.applied,
                        unmatched: patch.unmatched,
                        degradations: Vec::new(),
                        strategy: PatchStrategy::Splice,
                    }
                }
                Err(e) => {
                    warn!("Tree patch of '{}' failed: {}", document.title, e);
                    patch_flat_fallback(html.as_deref(), approved, Degradation::from(e))
                }
            }
        }
        body => {
            let html = body.html().unwrap_or_default();
            if approved.is_empty() {
                return PatchResult::unchanged(PatchedBody::Flat(html.to_string()), PatchStrategy::Flat);
            }
            let degradation = Degradation::NoTree {
                representation: body.representation(),
            };
            patch_flat_fallback(Some(html), approved, degradation)
        }
    }
}

/// Patcher configured with a tree strategy
#[derive(Debug, Clone)]
pub struct Patcher {
    strategy: TreeStrategy,
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl Patcher {
    /// Leaf substitution patcher
    pub fn splice() -> Self {
        Self {
            strategy: TreeStrategy::Splice,
            provider: None,
        }
    }

    /// Patcher using `strategy`; `provider` performs rewrites
    pub fn new(strategy: TreeStrategy, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            strategy,
            provider: Some(provider),
        }
    }

    /// Configured tree strategy
    pub fn strategy(&self) -> TreeStrategy {
        self.strategy
    }

    /// Apply approved suggestions to `document`
    pub async fn apply(&self, document: &Document, approved: &[Suggestion]) -> PatchResult {
        let provider = match (&self.strategy, &self.provider) {
            (TreeStrategy::Rewrite, Some(provider)) => provider,
            _ => return apply_approved(document, approved),
        };

        let DocumentBody::Tree { lexical, html } = &document.body else {
            return apply_approved(document, approved);
        };

        if approved.is_empty() {
            return PatchResult::unchanged(PatchedBody::Tree(lexical.clone()), PatchStrategy::Rewrite);
        }

        match rewrite::rewrite_tree(provider.as_ref(), lexical, approved).await {
            Ok(body) => {
                info!("Tree rewrite returned {} bytes", body.len());
                PatchResult {
                    body: PatchedBody::Tree(body),
                    applied: approved.len(),
                    unmatched: Vec::new(),
                    degradations: Vec::new(),
                    strategy: PatchStrategy::Rewrite,
                }
            }
            Err(e) => {
                warn!("Tree rewrite of '{}' failed: {}", document.title, e);
                patch_flat_fallback(
                    html.as_deref(),
                    approved,
                    Degradation::RewriteFailed(e.to_string()),
                )
            }
        }
    }
}

fn patch_flat_fallback(
    html: Option<&str>,
    approved: &[Suggestion],
    degradation: Degradation,
) -> PatchResult {
    info!("Falling back to flat text: {}", degradation);
    let patch = flat::patch_flat(html.unwrap_or_default(), approved);
    PatchResult {
        body: PatchedBody::Flat(patch.body),
        applied: patch.applied,
        unmatched: patch.unmatched,
        degradations: vec![degradation],
        strategy: PatchStrategy::Flat,
    }
}

fn strip_markup(html: &str) -> String {
    MARKUP_TAG.replace_all(html, "").into_owned()
}

fn tree_text(raw: &str) -> String {
    match LexicalTree::parse(raw) {
        Ok(tree) => tree.text_leaves().concat(),
        Err(_) => strip_markup(raw),
    }
}
