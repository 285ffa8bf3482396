//! Caller-facing error type shared across crates.

use thiserror::Error;

use crate::protocol::ErrorResponse;

/// Error surfaced to whoever asked for a note.
///
/// Variants map to HTTP status codes an API layer would return:
/// - [`PublicError::NotFoundOrInaccessible`] → 404
/// - [`PublicError::BadRequest`] → 400
/// - [`PublicError::Unavailable`] → 503
/// - [`PublicError::Internal`] → 500
///
/// A missing note and a note that fails an integrity check are deliberately the
/// same variant, with the same message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublicError {
    /// The note does not exist or cannot be decrypted.
    #[error("note not found or inaccessible")]
    NotFoundOrInaccessible,

    /// The caller supplied something unusable (bad id, empty note, ...).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The storage collaborator is temporarily unavailable.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PublicError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            PublicError::NotFoundOrInaccessible => 404,
            PublicError::BadRequest(_) => 400,
            PublicError::Unavailable(_) => 503,
            PublicError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code (e.g. `"NOT_FOUND"`).
    pub fn code(&self) -> &'static str {
        match self {
            PublicError::NotFoundOrInaccessible => "NOT_FOUND",
            PublicError::BadRequest(_) => "BAD_REQUEST",
            PublicError::Unavailable(_) => "UNAVAILABLE",
            PublicError::Internal(_) => "INTERNAL",
        }
    }

    /// Build the JSON error body for this error.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.code(), self.to_string())
    }
}
