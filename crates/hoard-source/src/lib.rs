//! Resumable byte sources for hoard.
//!
//! Every remote object, whether it sits behind an HTTP(S) URL or in an
//! S3-compatible bucket, is reached through the same two operations:
//! [`Source::open`] from an offset, and [`Source::size`]. The transfer engine
//! only ever sees that contract, so adding a transport never touches it.
//!
//! - [`Locator`] parses `https://…` and `s3://alias/key`
//! - [`Endpoints`] is the alias table S3 locators are resolved against
//! - [`SourceResolver`] owns the shared clients and hands out [`AnySource`]s
//! - [`BlobStore`] is the key/value view of a bucket used by the cache

mod endpoint;
mod error;
mod http;
mod locator;
mod range;
mod resolve;
mod s3;
mod source;

pub use endpoint::{Access, Endpoint, Endpoints};
pub use error::{Result, SourceError};
pub use http::{HttpSource, http_client};
pub use locator::Locator;
pub use range::{content_range_total, range_header, total_size, unsatisfied_range_total};
pub use resolve::{AnySource, SourceResolver};
pub use s3::{S3Bucket, S3Source};
pub use source::{BlobStore, BoxStream, ByteStream, Opened, Resolve, Source};
