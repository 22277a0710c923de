use std::path::Path;

use futures_util::StreamExt;
use hoard_source::BlobStore;
use hoard_verify::{Digest, Verification, verify_file};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::error::{FetchError, Result};

use super::transfer::ensure_parent;

/// Content-addressable cache over a [`BlobStore`].
///
/// Objects are stored under their hex digest. The store is trusted for
/// nothing: every retrieved object is re-hashed before it is allowed onto
/// the destination path.
#[derive(Debug)]
pub struct Cache<S> {
    store: S,
}

impl<S: BlobStore> Cache<S> {
    pub fn new(store: S) -> Self { Self { store } }

    /// Restore the object for `digest` onto `destination`.
    ///
    /// `Ok(false)` when the cache does not have it. Bytes are streamed into a
    /// temporary file in the destination directory and persisted only after
    /// they hash to `digest`; a mismatch discards them and returns
    /// [`FetchError::ChecksumMismatch`].
    pub async fn fetch(&self, digest: &Digest, destination: &Path, cancel: &CancellationToken) -> Result<bool> {
        let key = digest.as_str();
        let exists = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            exists = self.store.exists(key) => exists?,
        };
        if !exists {
            return Ok(false);
        }

        ensure_parent(destination).await?;
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = tempfile::Builder::new()
            .prefix(".hoard-cache-")
            .tempfile_in(dir)
            .map_err(FetchError::io(dir))?;
        let (file, temp_path) = temp.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            opened = self.store.get(key) => opened?,
        };
        let mut stream = opened.stream;
        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                chunk = stream.next() => chunk,
            };
            let Some(chunk) = chunk else { break };
            file.write_all(&chunk?).await.map_err(FetchError::io(&temp_path))?;
        }
        file.flush().await.map_err(FetchError::io(&temp_path))?;
        drop(file);

        if let Verification::Mismatch { actual } = verify_file(&temp_path, digest).await? {
            return Err(FetchError::ChecksumMismatch {
                path: destination.to_path_buf(),
                expected: digest.clone(),
                actual,
            });
        }

        temp_path
            .persist(destination)
            .map_err(|err| FetchError::io(destination)(err.error))?;
        Ok(true)
    }

    /// Upload `path` under `digest` unless the cache already has it.
    pub async fn store(&self, digest: &Digest, path: &Path, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            stored = self.upload(digest, path) => stored,
        }
    }

    async fn upload(&self, digest: &Digest, path: &Path) -> Result<()> {
        let key = digest.as_str();
        if self.store.exists(key).await? {
            tracing::debug!(%digest, "already cached");
            return Ok(());
        }
        self.store.put(key, path).await?;
        tracing::info!(%digest, path = %path.display(), "stored in cache");
        Ok(())
    }
}
