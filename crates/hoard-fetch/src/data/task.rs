use std::path::{Path, PathBuf};

use hoard_verify::Digest;

use crate::core::staging_path;

/// One file to bring to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// `https://…`, `http://…` or `s3://alias/key`.
    pub locator:     String,
    pub destination: PathBuf,
    pub digest:      Digest,
}

impl FileTask {
    pub fn new(locator: impl Into<String>, destination: impl Into<PathBuf>, digest: Digest) -> Self {
        Self {
            locator: locator.into(),
            destination: destination.into(),
            digest,
        }
    }
}

/// Per-task transfer bookkeeping, owned by exactly one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferState {
    pub staging_path: PathBuf,
    /// Bytes in the staging file when the current attempt started writing.
    pub staged_bytes: u64,
    /// 1-based; 0 before the first attempt.
    pub attempt:      u32,
}

impl TransferState {
    pub fn new(destination: &Path) -> Self {
        Self {
            staging_path: staging_path(destination),
            staged_bytes: 0,
            attempt:      0,
        }
    }
}
