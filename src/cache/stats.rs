//! Cache Statistics Module
//!
//! Counts lookups, evictions, expirations and resurrections.

use serde::Serialize;

// == Cache Stats ==
/// Tracks how a fading cache has been used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a value
    pub hits: u64,
    /// Lookups that found nothing (absent, expired or reclaimed)
    pub misses: u64,
    /// Entries dropped from the tail by the count limit
    pub evictions: u64,
    /// Entries dropped by the age limit
    pub expirations: u64,
    /// Evicted entries re-admitted because someone still held them
    pub resurrections: u64,
    /// Members of the retention list when the snapshot was taken
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub(crate) fn record_resurrection(&mut self) {
        self.resurrections += 1;
    }
}
