//! Two-tier recognition caching.
//!
//! Tier one lives inside the feature extractor and memoizes per-region
//! descriptors. Tier two is [`RecognitionCache`]: a whole-frame store mapping
//! a frame fingerprint to the finished detection list, so re-analyzing an
//! unchanged screen skips the pipeline entirely. Both tiers share the bounded
//! [`LruMap`] and are transparent: hit or miss, callers observe identical
//! results.
//!
//! Fingerprints cover the pixel bytes plus the serialized configuration and
//! the requested type set, so a config change can never serve stale output.

mod lru;

pub use lru::LruMap;

use crate::image::ImageRgb8;
use crate::spatial::Detection;
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Sha256 digest identifying a frame (or region) under a configuration.
pub type Fingerprint = [u8; 32];

/// Counter snapshot for diagnostics. Hit rate is hits / (hits + misses).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Inner {
    map: LruMap<Fingerprint, Vec<Detection>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Whole-frame detection cache with interior mutability.
pub struct RecognitionCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl RecognitionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner {
                map: LruMap::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        }
    }

    /// Look up a frame fingerprint, counting the hit or miss.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Vec<Detection>> {
        let mut inner = self.inner.lock();
        match inner.map.get(fingerprint) {
            Some(detections) => {
                let out = detections.clone();
                inner.hits += 1;
                Some(out)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    pub fn insert(&self, fingerprint: Fingerprint, detections: Vec<Detection>) {
        let mut inner = self.inner.lock();
        if inner.map.insert(fingerprint, detections) {
            inner.evictions += 1;
        }
    }

    /// Drop all entries. Counters survive so hit rates stay meaningful
    /// across an explicit invalidation.
    pub fn clear(&self) {
        self.inner.lock().map.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.map.len(),
            capacity: self.capacity,
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
        }
    }
}

/// Fingerprint of a frame under a given salt (serialized configuration and
/// requested types). Identical pixels and salt always collide, any pixel or
/// salt change practically never does.
pub fn frame_fingerprint(frame: &ImageRgb8<'_>, salt: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update((frame.w as u64).to_le_bytes());
    hasher.update((frame.h as u64).to_le_bytes());
    for y in 0..frame.h {
        hasher.update(&frame.row_rgb(y)[..frame.w * 3]);
    }
    hasher.update(salt);
    hasher.finalize().into()
}
