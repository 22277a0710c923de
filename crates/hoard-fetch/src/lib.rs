//! Resumable, verified, cache-aware bulk downloads.
//!
//! # Architecture
//!
//! - [`data`]: tasks, options, progress and results
//! - [`core`]: pure helpers (staging paths, retry delays)
//! - [`effects`]: cache, transfer engine, retry controller, pipeline, scheduler
//!
//! # Guarantees
//!
//! - Bytes land in `<dest>.partial` and reach `<dest>` only through a rename
//!   after the whole file hashed to the expected digest.
//! - An interrupted transfer resumes from the staged length with a ranged
//!   request.
//! - Cache content is re-verified before use; a bad cache never fails a task.
//! - Cancellation stops every task at its next suspension point and is
//!   reported as [`Status::Cancelled`], not as an error.
//!
//! ```no_run
//! use hoard_fetch::{FetchOptions, FileTask, Pipeline, Scheduler};
//! use hoard_source::{Endpoints, S3Bucket, SourceResolver};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let options = FetchOptions::default();
//! let resolver = SourceResolver::connect(&Endpoints::new(), None).await?;
//! let pipeline = Pipeline::<_, S3Bucket>::new(resolver, &options);
//! let scheduler = Scheduler::new(pipeline, options.concurrency);
//!
//! let task = FileTask::new(
//!     "https://example.com/app.tar.gz",
//!     "out/app.tar.gz",
//!     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9".parse()?,
//! );
//! let report = scheduler.run(vec![task], &CancellationToken::new()).await;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use self::core::{STAGING_SUFFIX, retry_delay, staging_path};
pub use data::{
    Backoff, DownloadResult, FetchOptions, FetchPhase, FileTask, Progress, ProgressFn, Report, Reporter,
    RetryPolicy, Status, TransferState,
};
pub use effects::{Cache, Pipeline, Scheduler, check_existing, fetch_with_retry, transfer};
pub use error::{FetchError, Result};
