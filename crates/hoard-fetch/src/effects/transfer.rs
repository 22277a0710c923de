use std::io::ErrorKind;
use std::path::Path;

use futures_util::StreamExt;
use hoard_source::Source;
use hoard_verify::{Verification, verify_file};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::data::{FetchPhase, FileTask, Reporter, TransferState};
use crate::error::{FetchError, Result};

/// Create the directory a file is about to be written into.
pub(crate) async fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .await
            .map_err(FetchError::io(parent)),
        _ => Ok(()),
    }
}

/// Whether the destination already holds the expected content.
///
/// A directory at the destination is an error for this task; any other
/// existing file is re-hashed.
pub async fn check_existing(task: &FileTask) -> Result<bool> {
    let metadata = match fs::metadata(&task.destination).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(FetchError::io(&task.destination)(err)),
    };
    if metadata.is_dir() {
        return Err(FetchError::DestinationIsDirectory(task.destination.clone()));
    }
    Ok(verify_file(&task.destination, &task.digest).await?.is_match())
}

/// Open the staging file, appending when it already holds bytes.
async fn open_staging(path: &Path) -> Result<(File, u64)> {
    let staged = match fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => metadata.len(),
        _ => 0,
    };
    let file = if staged > 0 {
        OpenOptions::new().append(true).open(path).await
    } else {
        File::create(path).await
    };
    Ok((file.map_err(FetchError::io(path))?, staged))
}

/// One resumable, verified download attempt.
///
/// Bytes are appended to the staging file from wherever the previous
/// attempt stopped. Once the stream ends the whole staging file is hashed;
/// a mismatch deletes it, a match renames it onto the destination. The
/// destination is never written any other way.
///
/// A staging file that already reaches the end of the object goes straight
/// to verification. On cancellation the staging file is left in place for a
/// later run.
pub async fn transfer<S: Source>(
    source: &S,
    task: &FileTask,
    state: &mut TransferState,
    cancel: &CancellationToken,
    progress: &Reporter,
) -> Result<()> {
    let staging = state.staging_path.clone();
    ensure_parent(&task.destination).await?;

    let (mut file, offset) = open_staging(&staging).await?;
    state.staged_bytes = offset;
    progress.report(FetchPhase::Connecting, offset, None, state.attempt);

    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        opened = source.open(offset) => opened?,
    };

    let mut written = offset;
    if opened.start != offset {
        // Range ignored: the body starts at byte 0.
        tracing::debug!(path = %staging.display(), offset, "source sent the full object, restarting staging file");
        file.set_len(0).await.map_err(FetchError::io(&staging))?;
        state.staged_bytes = 0;
        written = 0;
    }

    let total = opened.total_size;
    tracing::debug!(locator = %task.locator, offset = written, ?total, attempt = state.attempt, "transfer started");
    progress.report(FetchPhase::Downloading, written, total, state.attempt);

    let mut stream = opened.stream;
    if written > 0 && total.is_some_and(|total| total <= written) {
        tracing::debug!(path = %staging.display(), staged = written, ?total, "staging file already reaches the end");
    } else {
        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    file.flush().await.map_err(FetchError::io(&staging))?;
                    return Err(FetchError::Cancelled);
                }
                chunk = stream.next() => chunk,
            };
            let Some(chunk) = chunk else { break };
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(FetchError::io(&staging))?;
            written += chunk.len() as u64;
            progress.report(FetchPhase::Downloading, written, total, state.attempt);
        }
    }
    file.flush().await.map_err(FetchError::io(&staging))?;
    file.sync_all().await.map_err(FetchError::io(&staging))?;
    drop(file);

    progress.report(FetchPhase::Verifying, written, total, state.attempt);
    if let Verification::Mismatch { actual } = verify_file(&staging, &task.digest).await? {
        fs::remove_file(&staging).await.map_err(FetchError::io(&staging))?;
        state.staged_bytes = 0;
        return Err(FetchError::ChecksumMismatch {
            path: task.destination.clone(),
            expected: task.digest.clone(),
            actual,
        });
    }

    progress.report(FetchPhase::Committing, written, total, state.attempt);
    fs::rename(&staging, &task.destination)
        .await
        .map_err(FetchError::io(&task.destination))?;

    progress.report(FetchPhase::Completed, written, total, state.attempt);
    Ok(())
}
