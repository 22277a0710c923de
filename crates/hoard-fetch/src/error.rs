//! Error types for hoard-fetch.

use std::io;
use std::path::{Path, PathBuf};

use hoard_source::SourceError;
use hoard_verify::{Digest, VerificationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("file I/O error on {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path:     PathBuf,
        expected: Digest,
        actual:   Digest,
    },

    #[error("destination path {0} is a directory")]
    DestinationIsDirectory(PathBuf),

    #[error("download cancelled")]
    Cancelled,

    #[error("all {attempts} attempts failed: {last}")]
    AttemptsExhausted {
        attempts: u32,
        #[source]
        last:     Box<FetchError>,
    },

    #[error(transparent)]
    Verify(#[from] VerificationError),

    #[error("download task aborted: {0}")]
    Aborted(String),
}

impl FetchError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> FetchError + '_ {
        move |source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether another attempt could succeed where this one failed.
    ///
    /// Cancellation, configuration mistakes and a directory sitting at the
    /// destination fail identically every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Source(err) => err.is_retryable(),
            FetchError::Cancelled
            | FetchError::DestinationIsDirectory(_)
            | FetchError::AttemptsExhausted { .. }
            | FetchError::Aborted(_) => false,
            FetchError::Io { .. } | FetchError::ChecksumMismatch { .. } | FetchError::Verify(_) => true,
        }
    }

    pub fn is_cancelled(&self) -> bool { matches!(self, FetchError::Cancelled) }
}

pub type Result<T> = std::result::Result<T, FetchError>;
