//! Error types for hoard-source.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unsupported locator scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid locator {locator}: {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("alias {0:?} not found")]
    AliasNotFound(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status code {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("object store error: {0}")]
    Api(String),

    #[error("content length not available for {0}")]
    MissingContentLength(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SourceError {
    /// Configuration mistakes fail the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            SourceError::UnsupportedScheme(_)
                | SourceError::InvalidLocator { .. }
                | SourceError::AliasNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
