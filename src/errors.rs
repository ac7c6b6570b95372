/*!
 * Error types for the proofreader application.
 *
 * This module contains custom error types for the different parts of the
 * application, using the thiserror crate for ergonomic error definitions.
 * Stage-local and patch-local failures are recoverable; only store failures
 * during the final write are terminal for a session.
 */

use thiserror::Error;

/// Errors that can occur when working with completion provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the failed request may succeed if sent again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors raised when a completion result does not conform to the expected schema
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The completion text did not contain a JSON object
    #[error("No JSON object found in completion: {0}")]
    NoJson(String),

    /// The JSON did not match the expected shape
    #[error("Completion does not match the {schema} schema: {message}")]
    Mismatch {
        /// Name of the expected schema
        schema: &'static str,
        /// Decoder message
        message: String,
    },

    /// The JSON matched the shape but violates a content invariant
    #[error("Invalid {field}: {message}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// Why a single pipeline stage contributed nothing
#[derive(Error, Debug)]
pub enum StageError {
    /// The completion call itself failed
    #[error("Transport error: {0}")]
    Transport(#[from] ProviderError),

    /// The completion result failed validation
    #[error("Schema validation error: {0}")]
    Schema(#[from] SchemaError),
}

/// Errors that can occur when talking to the document store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The stored version stamp no longer matches the one supplied with the write
    #[error("Version conflict on document {document_id}: {message}")]
    Conflict {
        /// Document whose write was rejected
        document_id: String,
        /// Message from the store
        message: String,
    },

    /// The requested document does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Network failure while talking to the store
    #[error("Store request failed: {0}")]
    Transport(String),

    /// Error status returned by the store
    #[error("Store responded with error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the store
        message: String,
    },

    /// Credentials were rejected or could not be built
    #[error("Store authentication error: {0}")]
    Authentication(String),

    /// The store's response could not be decoded
    #[error("Failed to parse store response: {0}")]
    Parse(String),
}

/// Errors raised while reading or rebuilding a tree-structured body
#[derive(Error, Debug)]
pub enum TreeError {
    /// The serialized tree is not valid JSON or lacks a root node
    #[error("Malformed tree body: {0}")]
    Parse(String),

    /// The tree could not be turned back into its serialized form
    #[error("Structural error in tree body: {0}")]
    Structural(String),
}

/// Errors from the single guarded write of a session
#[derive(Error, Debug)]
pub enum ApplyError {
    /// The document changed in the store since it was read
    #[error("Document was modified since it was read: {0}")]
    Conflict(String),

    /// The write could not be completed
    #[error("Failed to write document: {0}")]
    Transport(#[source] StoreError),
}

impl From<StoreError> for ApplyError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict { message, .. } => Self::Conflict(message),
            other => Self::Transport(other),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the document store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from the final write
    #[error("Apply error: {0}")]
    Apply(#[from] ApplyError),

    /// Error from the audit database
    #[error("Audit error: {0}")]
    Audit(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Audit(error.to_string())
    }
}
