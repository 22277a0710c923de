//! YAML download manifests.
//!
//! ```yaml
//! aliases:
//!   minio:
//!     endpoint: http://127.0.0.1:9000
//!     bucket: artifacts
//!     access_key: ${MINIO_ACCESS_KEY}
//!     secret_key: ${MINIO_SECRET_KEY}
//! cache:
//!   enabled: true
//!   alias: minio
//! settings:
//!   parallel: 8
//!   retry_delay: 2s
//! files:
//!   - url: s3://minio/app.tar.gz
//!     dest: out/app.tar.gz
//!     sha256: b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9
//! ```
//!
//! [`load_multiple`] merges several such files, applies defaults, and
//! validates the result; the [`Manifest`] conversion methods then produce
//! the tasks, endpoints and options the download engine runs with.

mod convert;
mod duration;
mod env;
mod error;
mod load;
mod manifest;

pub use duration::{format_duration, parse_duration};
pub use env::{expand_env_vars, expand_with};
pub use error::{ConfigError, ParseDurationError, Result};
pub use load::{load, load_multiple};
pub use manifest::{
    Alias, CacheConfig, DEFAULT_PARALLEL, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, FileEntry, Manifest, Settings,
};
