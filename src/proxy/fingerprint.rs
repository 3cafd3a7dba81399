//! Request identity for cache lookup
//!
//! A fingerprint is the lowercase hex SHA-1 of the serialized audit payload.
//! It is a cache key only and carries no security meaning.

use derive_more::Display;
use sha1::{Digest, Sha1};

/// Length of a hex-encoded SHA-1 digest
pub const FINGERPRINT_LEN: usize = 40;

#[derive(Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{_0}")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Digest an already-serialized payload
    pub fn of_bytes(serialized: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(serialized);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
