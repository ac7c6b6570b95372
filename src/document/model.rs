/*!
 * Document model for drafts under review.
 *
 * A document carries exactly one authoritative body representation. The
 * representations the store can hand back are modelled as a tagged union so
 * that patch strategy selection is an exhaustive match rather than a series
 * of presence checks on nullable fields.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque version stamp issued by the store.
///
/// Kept exactly as received; the store alone decides whether it still matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionStamp(String);

impl VersionStamp {
    /// Wrap a stamp received from the store
    pub fn new(stamp: impl Into<String>) -> Self {
        Self(stamp.into())
    }

    /// The stamp as received
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Not yet published
    #[default]
    Draft,
    /// Publicly visible
    Published,
    /// Waiting for its publication date
    Scheduled,
    /// Delivered as a newsletter only
    Sent,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStatus::Draft => write!(f, "draft"),
            DocumentStatus::Published => write!(f, "published"),
            DocumentStatus::Scheduled => write!(f, "scheduled"),
            DocumentStatus::Sent => write!(f, "sent"),
        }
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(DocumentStatus::Draft),
            "published" => Ok(DocumentStatus::Published),
            "scheduled" => Ok(DocumentStatus::Scheduled),
            "sent" => Ok(DocumentStatus::Sent),
            _ => Err(anyhow::anyhow!("Invalid document status: {}", s)),
        }
    }
}

/// Body of a document in its authoritative representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentBody {
    /// Tree-structured rich body (Lexical JSON), with the HTML rendering kept
    /// for flat-text fallback
    Tree {
        /// Serialized Lexical tree
        lexical: String,
        /// HTML rendering, if the store returned one
        html: Option<String>,
    },
    /// Legacy semi-structured body (Mobiledoc); only ever patched as flat text
    Legacy {
        /// Serialized Mobiledoc
        mobiledoc: String,
        /// HTML rendering, if the store returned one
        html: Option<String>,
    },
    /// Flat HTML only
    Flat {
        /// HTML body
        html: String,
    },
    /// No body at all
    Empty,
}

impl DocumentBody {
    /// Choose the authoritative representation from whatever the store returned.
    ///
    /// Empty strings count as absent. Tree wins over legacy, legacy over flat.
    pub fn from_representations(
        lexical: Option<String>,
        mobiledoc: Option<String>,
        html: Option<String>,
    ) -> Self {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let html = present(html);

        match (present(lexical), present(mobiledoc)) {
            (Some(lexical), _) => DocumentBody::Tree { lexical, html },
            (None, Some(mobiledoc)) => DocumentBody::Legacy { mobiledoc, html },
            (None, None) => match html {
                Some(html) => DocumentBody::Flat { html },
                None => DocumentBody::Empty,
            },
        }
    }

    /// HTML rendering of the body, if any
    pub fn html(&self) -> Option<&str> {
        match self {
            DocumentBody::Tree { html, .. } | DocumentBody::Legacy { html, .. } => html.as_deref(),
            DocumentBody::Flat { html } => Some(html),
            DocumentBody::Empty => None,
        }
    }

    /// Text handed to the analysis stages: HTML first, then the serialized
    /// representation when no HTML exists
    pub fn analysis_text(&self) -> &str {
        if let Some(html) = self.html() {
            return html;
        }

        match self {
            DocumentBody::Tree { lexical, .. } => lexical,
            DocumentBody::Legacy { mobiledoc, .. } => mobiledoc,
            DocumentBody::Flat { html } => html,
            DocumentBody::Empty => "",
        }
    }

    /// Short name of the representation, for logs
    pub fn representation(&self) -> &'static str {
        match self {
            DocumentBody::Tree { .. } => "lexical",
            DocumentBody::Legacy { .. } => "mobiledoc",
            DocumentBody::Flat { .. } => "html",
            DocumentBody::Empty => "empty",
        }
    }

    /// Whether there is no content at all
    pub fn is_empty(&self) -> bool {
        matches!(self, DocumentBody::Empty)
    }
}

/// A document read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Store identifier
    pub id: String,
    /// Title
    pub title: String,
    /// Publication status
    pub status: DocumentStatus,
    /// Authoritative body
    pub body: DocumentBody,
    /// Version stamp captured when the document was read
    pub updated_at: VersionStamp,
}

impl Document {
    /// Create a new document
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: DocumentBody,
        updated_at: VersionStamp,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: DocumentStatus::Draft,
            body,
            updated_at,
        }
    }

    /// Set the status
    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = status;
        self
    }

    /// Convenience constructor for a flat HTML draft
    pub fn flat(id: impl Into<String>, title: impl Into<String>, html: impl Into<String>) -> Self {
        Self::new(
            id,
            title,
            DocumentBody::Flat { html: html.into() },
            VersionStamp::new("1970-01-01T00:00:00.000Z"),
        )
    }
}
