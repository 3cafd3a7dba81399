//! Fallback cache of the last accepted upstream report per fingerprint
//!
//! Each fingerprint holds at most one entry. A successful forward overwrites
//! the entry; a fallback read removes it, so a cached report shields at most
//! one upstream failure before the relay has to reach the registry again.
//!
//! There is no expiry and no size bound; entries live as long as the cache.

use crate::proxy::fingerprint::Fingerprint;
use crate::upstream::UpstreamResponse;
use bytes::Bytes;
use http::{HeaderValue, StatusCode};
use parking_lot::Mutex;
use std::collections::HashMap;

/// An upstream report kept for fallback replay
#[derive(Clone, Debug, PartialEq)]
pub struct CachedReport {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl From<&UpstreamResponse> for CachedReport {
    fn from(response: &UpstreamResponse) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type.clone(),
            body: response.body.clone(),
        }
    }
}

/// Mutex-guarded single-slot-per-key store.
///
/// Every operation takes the lock for its own duration only; callers never
/// hold it across an `.await`.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<Fingerprint, CachedReport>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `report` under `fingerprint`, replacing any previous entry
    pub fn put(&self, fingerprint: Fingerprint, report: CachedReport) {
        self.entries.lock().insert(fingerprint, report);
    }

    /// Remove and return the entry for `fingerprint`, if any
    pub fn take_if_present(&self, fingerprint: &Fingerprint) -> Option<CachedReport> {
        self.entries.lock().remove(fingerprint)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.lock().contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
