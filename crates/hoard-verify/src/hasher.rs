use sha2::Digest as _;

use crate::digest::Digest;

/// Incremental hash over a byte stream, producing the [`Digest`] files are
/// pinned by.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);

    fn finish(self) -> Digest;
}

#[derive(Clone, Default)]
pub struct Sha256Hasher {
    state:  sha2::Sha256,
    hashed: u64,
}

impl Sha256Hasher {
    pub fn new() -> Self { Self::default() }

    /// Bytes fed in so far.
    pub fn hashed(&self) -> u64 { self.hashed }
}

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) {
        self.state.update(data);
        self.hashed += data.len() as u64;
    }

    fn finish(self) -> Digest { Digest::from_bytes(&self.state.finalize()) }
}
