use std::fmt;

use super::options::ProgressFn;

/// Phases a task moves through.
///
/// Checking → Connecting → Downloading → Verifying → Committing → Completed.
/// A retry returns to Connecting; a cache hit jumps from Checking to
/// Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Looking at the destination and the cache.
    #[default]
    Checking,

    /// Waiting for the source to answer.
    Connecting,

    /// Streaming chunks into the staging file.
    Downloading,

    /// Hashing the whole staging file.
    Verifying,

    /// Renaming the staging file onto the destination.
    Committing,

    Completed,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchPhase::Checking => "checking",
            FetchPhase::Connecting => "connecting",
            FetchPhase::Downloading => "downloading",
            FetchPhase::Verifying => "verifying",
            FetchPhase::Committing => "committing",
            FetchPhase::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Snapshot handed to the progress callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Position of the task in the input list.
    pub index: usize,

    pub phase: FetchPhase,

    /// Bytes in the staging file, counting bytes staged by earlier attempts.
    pub bytes_downloaded: u64,

    /// Size of the whole object, once the source has said.
    pub total_bytes: Option<u64>,

    /// Current attempt, 1-based; 0 outside of a transfer.
    pub attempt: u32,
}

impl Progress {
    /// Returns `None` while the total is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                if self.phase == FetchPhase::Completed { 100.0 } else { 0.0 }
            } else {
                (self.bytes_downloaded as f64 / total as f64) * 100.0
            }
        })
    }
}

/// Progress emitter bound to one task.
///
/// Without a callback every call is a no-op.
#[derive(Clone, Default)]
pub struct Reporter {
    index: usize,
    sink:  Option<ProgressFn>,
}

impl Reporter {
    pub fn new(index: usize, sink: Option<ProgressFn>) -> Self { Self { index, sink } }

    pub fn index(&self) -> usize { self.index }

    pub fn report(&self, phase: FetchPhase, bytes_downloaded: u64, total_bytes: Option<u64>, attempt: u32) {
        if let Some(sink) = &self.sink {
            sink(&Progress {
                index: self.index,
                phase,
                bytes_downloaded,
                total_bytes,
                attempt,
            });
        }
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("index", &self.index)
            .field("sink", &self.sink.as_ref().map(|_| "{ ... }"))
            .finish()
    }
}
