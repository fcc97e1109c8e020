//! TTL cache for directory resolutions.
//!
//! Read-mostly shared map behind a `parking_lot::RwLock`: concurrent
//! readers never block each other, and a write is a plain overwrite
//! (last writer wins). Staleness is bounded by the TTL, which is a
//! consistency/latency tradeoff — not a correctness requirement, since
//! motto confirmation always re-resolves through this cache's TTL window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use hub_core::NormalizedName;
use parking_lot::RwLock;

use crate::types::Resolution;

/// A cached resolution, positive or negative, with its insertion time.
///
/// Negative outcomes (`NotFound`, `Private`) are cached too: they are
/// terminal per query and hammering the provider with retries for a
/// missing name would only burn quota.
#[derive(Debug, Clone)]
struct CacheEntry {
    resolution: Resolution,
    inserted_at: Instant,
}

/// Shared TTL cache keyed by the case-folded display name.
#[derive(Debug)]
pub(crate) struct ResolutionCache {
    ttl: Duration,
    entries: RwLock<HashMap<NormalizedName, CacheEntry>>,
}

impl ResolutionCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the live cached resolution for `name`, if any.
    ///
    /// Expired entries are treated as misses; the next store overwrites
    /// them, so no eager eviction pass is needed.
    pub(crate) fn get(&self, name: &NormalizedName) -> Option<Resolution> {
        let entries = self.entries.read();
        let entry = entries.get(name)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.resolution.clone())
    }

    /// Insert or overwrite the resolution for `name`.
    pub(crate) fn store(&self, name: NormalizedName, resolution: Resolution) {
        let mut entries = self.entries.write();
        entries.insert(
            name,
            CacheEntry {
                resolution,
                inserted_at: Instant::now(),
            },
        );
    }
}
