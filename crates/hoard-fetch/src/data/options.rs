use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::progress::Progress;

/// Shared progress callback.
pub type ProgressFn = Arc<dyn Fn(&Progress) + Send + Sync>;

/// How the pause between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// The same delay before every retry.
    #[default]
    Fixed,
    /// `delay * 2^n` before retry `n` (0-based).
    Exponential,
}

/// Bounded retry around one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 behave as 1.
    ///
    /// Default: 3
    pub attempts: u32,

    /// Base pause between attempts.
    ///
    /// Default: 5s
    pub delay: Duration,

    /// Default: [`Backoff::Fixed`]
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay:    Duration::from_secs(5),
            backoff:  Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Run-wide settings for the scheduler and every pipeline it drives.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use hoard_fetch::{FetchOptions, FetchPhase, Progress, RetryPolicy};
///
/// let options = FetchOptions::default()
///     .concurrency(8)
///     .retry(RetryPolicy::default().attempts(5).delay(Duration::from_secs(1)))
///     .on_progress(Arc::new(|progress: &Progress| {
///         if progress.phase == FetchPhase::Completed {
///             println!("#{} done", progress.index);
///         }
///     }));
/// assert_eq!(options.concurrency, 8);
/// ```
#[derive(Clone)]
pub struct FetchOptions {
    /// Maximum number of tasks in flight at once.
    ///
    /// Default: 4
    pub concurrency: usize,

    pub retry: RetryPolicy,

    /// Invoked on phase transitions and after every chunk written.
    ///
    /// Default: None
    pub on_progress: Option<ProgressFn>,
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("concurrency", &self.concurrency)
            .field("retry", &self.retry)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "{ ... }"))
            .finish()
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry:       RetryPolicy::default(),
            on_progress: None,
        }
    }
}

impl FetchOptions {
    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn on_progress(mut self, on_progress: ProgressFn) -> Self {
        self.on_progress = Some(on_progress);
        self
    }
}
