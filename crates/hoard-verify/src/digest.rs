use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseDigestError;
use crate::hasher::{Hasher, Sha256Hasher};

/// Hex length of a SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// A validated, lower-case hex SHA-256 digest.
///
/// This is both the integrity check for a downloaded file and its key in the
/// content-addressable cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(String);

impl FromStr for Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != DIGEST_HEX_LEN || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseDigestError(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl Digest {
    pub fn from_hex(s: &str) -> Result<Self, ParseDigestError> { s.parse() }

    /// Digest of an in-memory buffer.
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha256Hasher::new();
        hasher.update(data);
        hasher.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Self { Self(hex::encode(bytes)) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str { &self.0 }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
