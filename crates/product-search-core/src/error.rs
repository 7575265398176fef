//! Error types for the paging service and its backends.

use thiserror::Error;

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by [`PagingSearchService`](crate::PagingSearchService)
/// and [`SearchBackend`](crate::backend::SearchBackend) implementations.
///
/// A missing document is not an error (`Ok(None)`), and an exhausted
/// result set is not an error either ([`Page::empty`](crate::Page::empty)).
#[derive(Error, Debug)]
pub enum Error {
    /// The backend could not be reached.
    #[error("search backend unavailable: {message}")]
    BackendUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend answered, but with an error status.
    #[error("search backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// An operation was invoked on a value that cannot support it, such as
    /// advancing past the terminal empty page.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A document could not be converted to or from JSON.
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A bulk response did not line up with the submitted batch.
    #[error("bulk response misaligned: expected {expected} outcomes, got {actual}")]
    BulkMismatch { expected: usize, actual: usize },

    /// A bulk outcome reported a different batch position than the slot it
    /// occupies in the response.
    #[error("bulk outcome {position} reports position {reported}")]
    BulkOutOfOrder { position: usize, reported: usize },

    /// A bulk outcome echoed a different id than the caller supplied for
    /// that slot.
    #[error("bulk outcome {position} stored id {reported:?}, expected {expected:?}")]
    BulkIdMismatch {
        position: usize,
        expected: String,
        reported: String,
    },

    /// One document in a bulk request was rejected.
    #[error("bulk item {position} failed: {reason}")]
    BulkItemFailed { position: usize, reason: String },
}

impl Error {
    /// Build a [`Error::BackendUnavailable`] from any transport error.
    pub fn unavailable<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::BackendUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
