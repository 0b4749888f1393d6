//! Cache Module
//!
//! Fading-memory cache: a weak key table in front of an owning, recency
//! ordered retention list bounded by count and/or age.

mod builder;
mod clock;
mod entry;
mod retention;
mod stats;
mod store;
mod weak_store;


// Re-export public types
pub use builder::CacheBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::EntryHandle;
pub use stats::CacheStats;
pub use store::{AsMapping, FadingCache, Items, ItemsNoPromote, Keys};
