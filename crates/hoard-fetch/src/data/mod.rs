//! Immutable data types for the download pipeline.
//!
//! Tasks and options are built once by the caller and shared read-only;
//! results are produced once per task and never change afterwards.

pub mod options;
pub mod progress;
pub mod result;
pub mod task;

pub use options::{Backoff, FetchOptions, ProgressFn, RetryPolicy};
pub use progress::{FetchPhase, Progress, Reporter};
pub use result::{DownloadResult, Report, Status};
pub use task::{FileTask, TransferState};
