//! Pure functions: no I/O, no clocks.

mod retry;
mod staging;

pub use retry::retry_delay;
pub use staging::{STAGING_SUFFIX, staging_path};
