use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::error::Result;

/// A boxed stream type for response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Body of an opened object, chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// An object opened for reading at some offset.
pub struct Opened {
    pub stream:     ByteStream,
    /// Offset the first chunk of `stream` belongs to.
    ///
    /// This is the requested offset when the server honoured the range, and 0
    /// when it answered a ranged request with the full object.
    pub start:      u64,
    /// Size of the whole object, when the response made it known.
    pub total_size: Option<u64>,
}

impl Opened {
    /// Nothing left to read: `offset` is at or past the end of the object.
    pub fn past_end(offset: u64, total_size: Option<u64>) -> Self {
        Self {
            stream: Box::pin(futures_util::stream::empty::<Result<Bytes>>()),
            start: offset,
            total_size,
        }
    }
}

impl std::fmt::Debug for Opened {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Opened")
            .field("start", &self.start)
            .field("total_size", &self.total_size)
            .finish_non_exhaustive()
    }
}

/// A remote object that can be read from an offset to its end.
///
/// # Implementations
///
/// - [`HttpSource`](crate::HttpSource): plain and ranged GETs via `reqwest`
/// - [`S3Source`](crate::S3Source): objects in an S3-compatible bucket
/// - [`AnySource`](crate::AnySource): either of the above, picked by locator
pub trait Source: Send + Sync {
    /// Start streaming the object from `offset` to its end.
    ///
    /// Any response other than full or partial content is an error for this
    /// attempt, except that a range starting past the end of the object
    /// opens as [`Opened::past_end`].
    fn open(&self, offset: u64) -> impl Future<Output = Result<Opened>> + Send;

    /// Total object size without reading the body.
    fn size(&self) -> impl Future<Output = Result<u64>> + Send;
}

/// Flat key/value object storage, the seam the content-addressable cache is
/// written against.
pub trait BlobStore: Send + Sync {
    /// `Ok(false)` for a missing key; errors mean the store could not answer.
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Stream the whole object stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Opened>> + Send;

    /// Upload the file at `path` under `key`.
    fn put(&self, key: &str, path: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// Turns a locator string into a concrete [`Source`].
pub trait Resolve: Send + Sync {
    type Source: Source + 'static;

    fn resolve(&self, locator: &str) -> Result<Self::Source>;
}
