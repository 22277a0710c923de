use crate::error::FetchError;

use super::task::FileTask;

/// Terminal outcome of one task.
#[derive(Debug)]
pub enum Status {
    /// The destination already held the expected content.
    Skipped,
    /// Restored from the content-addressable cache.
    Cached,
    /// Downloaded from its source.
    Fetched { attempts: u32 },
    /// Stopped by the cancellation token. Not a failure.
    Cancelled,
    Failed(FetchError),
}

impl Status {
    pub fn is_failed(&self) -> bool { matches!(self, Status::Failed(_)) }

    pub fn is_cancelled(&self) -> bool { matches!(self, Status::Cancelled) }
}

#[derive(Debug)]
pub struct DownloadResult {
    pub task:   FileTask,
    pub status: Status,
}

impl DownloadResult {
    /// The failure cause, if the task failed.
    pub fn error(&self) -> Option<&FetchError> {
        match &self.status {
            Status::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Results of one run, in input order.
#[derive(Debug, Default)]
pub struct Report {
    pub results: Vec<DownloadResult>,
}

impl Report {
    pub fn total(&self) -> usize { self.results.len() }

    pub fn failed(&self) -> usize { self.failures().count() }

    pub fn cancelled(&self) -> usize { self.results.iter().filter(|r| r.status.is_cancelled()).count() }

    /// A run is successful when no task carries an error.
    pub fn is_success(&self) -> bool { self.failed() == 0 }

    pub fn failures(&self) -> impl Iterator<Item = (&FileTask, &FetchError)> {
        self.results
            .iter()
            .filter_map(|r| r.error().map(|err| (&r.task, err)))
    }
}
