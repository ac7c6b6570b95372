use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an editorial suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// Spelling, grammar, punctuation
    Typo,
    /// Paragraphing, headings, ordering
    Structure,
    /// Logical flow and consistency
    Coherence,
}

impl SuggestionKind {
    /// Lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Typo => "typo",
            SuggestionKind::Structure => "structure",
            SuggestionKind::Coherence => "coherence",
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed replacement of one text fragment by another.
///
/// There are no offsets: the fragment is located by content when applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Category
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    /// Free-form hint for the reviewer, e.g. "paragraph 2"
    #[serde(default)]
    pub location: String,
    /// Exact fragment to replace; never empty
    pub original_text: String,
    /// Replacement text
    pub proposed_text: String,
    /// Why the change is proposed
    #[serde(default)]
    pub reasoning: String,
}

impl Suggestion {
    /// Create a suggestion without location or reasoning
    pub fn new(
        kind: SuggestionKind,
        original_text: impl Into<String>,
        proposed_text: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            location: String::new(),
            original_text: original_text.into(),
            proposed_text: proposed_text.into(),
            reasoning: String::new(),
        }
    }

    /// Set the location hint
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the reasoning
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    /// Short excerpt of the original fragment for reports
    pub fn excerpt(&self) -> String {
        const MAX_CHARS: usize = 60;
        let mut excerpt: String = self.original_text.chars().take(MAX_CHARS).collect();
        if self.original_text.chars().count() > MAX_CHARS {
            excerpt.push('…');
        }
        excerpt
    }
}
