//! Fading Cache - count and age bounded caching with weak rediscovery
//!
//! A key-value cache bounded by count and/or age whose evicted entries stay
//! rediscoverable while something outside the cache still holds them.

pub mod cache;
pub mod config;
pub mod error;
pub mod memo;

pub use cache::{
    CacheBuilder, CacheStats, Clock, EntryHandle, FadingCache, ManualClock, SystemClock,
};
pub use config::CachePolicy;
pub use error::{CacheError, Result};
pub use memo::{memo, memo_until, memoizer, nmemo, CallKey, MemoCall, MemoReply, Memoized};
