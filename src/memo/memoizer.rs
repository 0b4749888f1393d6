//! Memoizer Module
//!
//! Wraps a function so repeated calls with the same arguments are answered
//! from a fading cache.

use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use tracing::debug;

use crate::cache::{Clock, FadingCache, SystemClock};
use crate::config::CachePolicy;
use crate::error::Result;

/// Argument that asks a memoized function for its cache size.
pub const SIZE_SENTINEL: &str = "size_fading_cache";
/// Argument that asks a memoized function to forget everything.
pub const CLEAR_SENTINEL: &str = "clear_fading_cache";

// == Calls ==
/// A call into a [`Memoized`] function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoCall<A> {
    /// Regular invocation with arguments
    Args(A),
    /// Report the number of retained results
    ReportSize,
    /// Drop every retained result, including weak bindings
    Clear,
}

impl<A> MemoCall<A> {
    /// Maps the reserved sentinel names onto their calls.
    pub fn from_sentinel_name(name: &str) -> Option<Self> {
        match name {
            SIZE_SENTINEL => Some(MemoCall::ReportSize),
            CLEAR_SENTINEL => Some(MemoCall::Clear),
            _ => None,
        }
    }
}

/// Outcome of [`Memoized::invoke`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoReply<R> {
    Value(R),
    Size(usize),
    Cleared,
}

// == Memoized Function ==
/// A function whose results are kept in a [`FadingCache`] keyed by argument.
pub struct Memoized<A, R, F, C = SystemClock> {
    cache: FadingCache<A, R, C>,
    func: F,
}

impl<A, R, F, C> Memoized<A, R, F, C>
where
    A: Hash + Eq + Clone + fmt::Debug,
    R: Clone,
    F: FnMut(&A) -> R,
    C: Clock,
{
    /// Wraps `func` around an existing cache.
    pub fn with_cache(cache: FadingCache<A, R, C>, func: F) -> Self {
        Self { cache, func }
    }

    /// Returns the cached result for `args`, computing it on a miss.
    pub fn call(&mut self, args: A) -> R {
        if let Ok(value) = self.cache.get(&args) {
            return value;
        }

        let value = (self.func)(&args);
        self.cache.set(args, value.clone());
        value
    }

    /// Dispatches a call, handling the size and clear sentinels before any
    /// argument lookup.
    pub fn invoke(&mut self, call: MemoCall<A>) -> MemoReply<R> {
        match call {
            MemoCall::ReportSize => MemoReply::Size(self.cache_size()),
            MemoCall::Clear => {
                self.clear_cache();
                MemoReply::Cleared
            }
            MemoCall::Args(args) => MemoReply::Value(self.call(args)),
        }
    }

    pub fn cache_size(&mut self) -> usize {
        self.cache.len()
    }

    /// Forgets every result, so nothing can be re-admitted either.
    pub fn clear_cache(&mut self) {
        debug!("Clearing memoized results");
        self.cache.clear();
        self.cache.clear_weak();
    }

    pub fn cache(&mut self) -> &mut FadingCache<A, R, C> {
        &mut self.cache
    }
}

// == Constructors ==
/// Memoizes `func` under `policy`.
pub fn memoizer<A, R, F>(policy: CachePolicy, func: F) -> Result<Memoized<A, R, F>>
where
    A: Hash + Eq + Clone + fmt::Debug,
    R: Clone,
    F: FnMut(&A) -> R,
{
    Ok(Memoized::with_cache(FadingCache::new(policy)?, func))
}

/// Memoizes `func` without limits.
pub fn memo<A, R, F>(func: F) -> Memoized<A, R, F>
where
    A: Hash + Eq + Clone + fmt::Debug,
    R: Clone,
    F: FnMut(&A) -> R,
{
    Memoized::with_cache(FadingCache::unbounded(), func)
}

/// Memoizes `func`, recomputing results older than `max_age`.
pub fn memo_until<A, R, F>(max_age: Duration, func: F) -> Result<Memoized<A, R, F>>
where
    A: Hash + Eq + Clone + fmt::Debug,
    R: Clone,
    F: FnMut(&A) -> R,
{
    memoizer(CachePolicy::unbounded().with_max_age(max_age), func)
}

/// Memoizes `func`, keeping only the `limit` most recently used results.
pub fn nmemo<A, R, F>(limit: usize, func: F) -> Result<Memoized<A, R, F>>
where
    A: Hash + Eq + Clone + fmt::Debug,
    R: Clone,
    F: FnMut(&A) -> R,
{
    memoizer(CachePolicy::unbounded().with_max_count(limit), func)
}
