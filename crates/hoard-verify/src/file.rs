use std::io::Read;
use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::digest::Digest;
use crate::error::{Result, VerificationError};
use crate::hasher::{Hasher, Sha256Hasher};

const CHUNK_SIZE: usize = 64 * 1024;

/// Outcome of comparing a file against an expected digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Match,
    Mismatch { actual: Digest },
}

impl Verification {
    pub fn is_match(&self) -> bool { matches!(self, Verification::Match) }

    /// Turn a mismatch into an error carrying both digests.
    pub fn into_result(self, expected: &Digest) -> Result<()> {
        match self {
            Verification::Match => Ok(()),
            Verification::Mismatch { actual } => Err(VerificationError::Mismatch {
                expected: expected.to_string(),
                actual:   actual.to_string(),
            }),
        }
    }
}

/// Stream a file from byte 0 through SHA-256.
pub async fn file_digest(path: &Path) -> Result<Digest> {
    let io_err = |source| VerificationError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::open(path).await.map_err(io_err)?;
    let mut hasher = Sha256Hasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).await.map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish())
}

/// Blocking variant of [`file_digest`] for callers outside the runtime.
pub fn file_digest_blocking(path: &Path) -> Result<Digest> {
    let io_err = |source| VerificationError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let mut hasher = Sha256Hasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish())
}

pub async fn verify_file(path: &Path, expected: &Digest) -> Result<Verification> {
    let actual = file_digest(path).await?;
    if &actual == expected {
        Ok(Verification::Match)
    } else {
        Ok(Verification::Mismatch { actual })
    }
}
