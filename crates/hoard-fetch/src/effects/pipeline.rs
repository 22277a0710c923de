use std::sync::Arc;

use hoard_source::{BlobStore, Resolve};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::data::{FetchOptions, FetchPhase, FileTask, ProgressFn, Reporter, RetryPolicy, Status};
use crate::error::FetchError;

use super::cache::Cache;
use super::retry::fetch_with_retry;
use super::transfer::check_existing;

/// The per-file state machine.
///
/// existing destination → cache → source (with retry) → background cache
/// store. Every step degrades rather than fails where it can: a broken
/// cache only costs a source download.
pub struct Pipeline<R, S> {
    resolver:    R,
    cache:       Option<Arc<Cache<S>>>,
    retry:       RetryPolicy,
    on_progress: Option<ProgressFn>,
    uploads:     TaskTracker,
}

impl<R, S> Pipeline<R, S>
where
    R: Resolve,
    S: BlobStore + 'static,
{
    pub fn new(resolver: R, options: &FetchOptions) -> Self {
        Self {
            resolver,
            cache: None,
            retry: options.retry.clone(),
            on_progress: options.on_progress.clone(),
            uploads: TaskTracker::new(),
        }
    }

    /// Consult and fill a content-addressable cache backed by `store`.
    #[must_use]
    pub fn with_cache(mut self, store: S) -> Self {
        self.cache = Some(Arc::new(Cache::new(store)));
        self
    }

    /// Drive one task to a terminal status. `index` is only used to tag
    /// progress events.
    pub async fn run(&self, index: usize, task: &FileTask, cancel: &CancellationToken) -> Status {
        if cancel.is_cancelled() {
            return Status::Cancelled;
        }
        let progress = Reporter::new(index, self.on_progress.clone());
        progress.report(FetchPhase::Checking, 0, None, 0);

        match check_existing(task).await {
            Ok(true) => {
                tracing::info!(dest = %task.destination.display(), "skipping, already up to date");
                progress.report(FetchPhase::Completed, 0, None, 0);
                return Status::Skipped;
            }
            Ok(false) => {}
            Err(err) => return Status::Failed(err),
        }

        if let Some(cache) = &self.cache {
            match cache.fetch(&task.digest, &task.destination, cancel).await {
                Ok(true) => {
                    tracing::info!(dest = %task.destination.display(), digest = %task.digest, "restored from cache");
                    progress.report(FetchPhase::Completed, 0, None, 0);
                    return Status::Cached;
                }
                Ok(false) => tracing::debug!(digest = %task.digest, "cache miss"),
                Err(FetchError::Cancelled) => return Status::Cancelled,
                Err(err) => tracing::warn!(dest = %task.destination.display(), error = %err, "cache unavailable, using source"),
            }
        }

        let source = match self.resolver.resolve(&task.locator) {
            Ok(source) => source,
            Err(err) => return Status::Failed(err.into()),
        };

        match fetch_with_retry(&source, task, &self.retry, cancel, &progress).await {
            Ok(attempts) => {
                tracing::info!(dest = %task.destination.display(), attempts, "downloaded");
                self.store_in_background(task, cancel);
                Status::Fetched { attempts }
            }
            Err(FetchError::Cancelled) => Status::Cancelled,
            Err(err) => Status::Failed(err),
        }
    }

    fn store_in_background(&self, task: &FileTask, cancel: &CancellationToken) {
        let Some(cache) = &self.cache else { return };
        let cache = Arc::clone(cache);
        let digest = task.digest.clone();
        let path = task.destination.clone();
        let cancel = cancel.clone();
        self.uploads.spawn(async move {
            match cache.store(&digest, &path, &cancel).await {
                Ok(()) => {}
                Err(FetchError::Cancelled) => tracing::debug!(%digest, "cache store skipped, cancelled"),
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "could not store in cache"),
            }
        });
    }

    /// Wait for every background cache store started so far.
    pub async fn wait_for_uploads(&self) {
        self.uploads.close();
        self.uploads.wait().await;
        self.uploads.reopen();
    }
}
