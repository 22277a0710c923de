//! Filesystem and network effects: the cache, one transfer attempt, the
//! retry loop around it, the per-file pipeline, and the scheduler.

mod cache;
mod pipeline;
mod retry;
mod scheduler;
mod transfer;

pub use cache::Cache;
pub use pipeline::Pipeline;
pub use retry::fetch_with_retry;
pub use scheduler::Scheduler;
pub use transfer::{check_existing, transfer};
