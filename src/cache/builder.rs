//! Cache Builder Module
//!
//! Fluent construction of a [`FadingCache`] with validated limits and an
//! optional injected clock.

use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::store::FadingCache;
use crate::config::CachePolicy;
use crate::error::Result;

// == Cache Builder ==
/// Builder for configuring a [`FadingCache`].
///
/// # Example
///
/// ```
/// use fading_cache::{CacheBuilder, FadingCache};
///
/// let cache: FadingCache<String, u64> = CacheBuilder::new()
///     .max_count(1_000)
///     .max_age_secs(3_600)
///     .build()
///     .unwrap();
/// assert_eq!(cache.policy().max_count, Some(1_000));
/// ```
#[derive(Debug, Clone)]
pub struct CacheBuilder<C = SystemClock> {
    policy: CachePolicy,
    clock: C,
}

impl CacheBuilder<SystemClock> {
    /// Creates a builder for an unbounded cache on the wall clock.
    pub fn new() -> Self {
        Self {
            policy: CachePolicy::unbounded(),
            clock: SystemClock,
        }
    }
}

impl Default for CacheBuilder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> CacheBuilder<C> {
    /// Limits the cache to `max_count` retained entries.
    pub fn max_count(mut self, max_count: usize) -> Self {
        self.policy.max_count = Some(max_count);
        self
    }

    /// Expires entries not touched for longer than `max_age`.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.policy.max_age = Some(max_age);
        self
    }

    pub fn max_age_secs(self, secs: u64) -> Self {
        self.max_age(Duration::from_secs(secs))
    }

    /// Replaces both limits at once.
    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Swaps the time source, typically for a [`ManualClock`](crate::ManualClock) in tests.
    pub fn clock<C2: Clock>(self, clock: C2) -> CacheBuilder<C2> {
        CacheBuilder {
            policy: self.policy,
            clock,
        }
    }

    /// Validates the policy and builds the cache.
    pub fn build<K, V>(self) -> Result<FadingCache<K, V, C>>
    where
        K: Hash + Eq + Clone + fmt::Debug,
    {
        FadingCache::with_clock(self.policy, self.clock)
    }
}
