//! Content digests for fetched artifacts.
//!
//! A [`Digest`] is the single identity of a file in hoard: it is what the
//! manifest pins, what a finished download is checked against, and the key
//! the content-addressable cache stores the bytes under.
//!
//! # Example
//!
//! ```
//! use hoard_verify::{Digest, Hasher, Sha256Hasher};
//!
//! let mut hasher = Sha256Hasher::new();
//! hasher.update(b"hello ");
//! hasher.update(b"world");
//! assert_eq!(hasher.finish(), Digest::of(b"hello world"));
//!
//! let pinned: Digest = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
//!     .parse()
//!     .unwrap();
//! assert_eq!(Digest::of(b"hello world"), pinned);
//! ```

pub use self::digest::{DIGEST_HEX_LEN, Digest};
pub use self::error::{ParseDigestError, Result, VerificationError};
pub use self::file::{Verification, file_digest, file_digest_blocking, verify_file};
pub use self::hasher::{Hasher, Sha256Hasher};

mod digest;
mod error;
mod file;
mod hasher;
