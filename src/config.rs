//! Configuration Module
//!
//! Retention policy for a fading cache, with validation and environment loading.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Environment variable holding the maximum number of retained entries.
pub const ENV_MAX_COUNT: &str = "FADING_CACHE_MAX_COUNT";
/// Environment variable holding the maximum entry age in seconds.
pub const ENV_MAX_AGE_SECS: &str = "FADING_CACHE_MAX_AGE_SECS";

/// Retention policy, fixed when a cache is built.
///
/// Both limits are optional and enforced independently: an entry leaves the
/// retention list as soon as either one is exceeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Maximum number of retained entries, None = unlimited
    pub max_count: Option<usize>,
    /// Maximum time since last touch, None = unlimited
    pub max_age: Option<Duration>,
}

impl CachePolicy {
    /// Policy that keeps everything forever.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Creates a validated policy.
    pub fn new(max_count: Option<usize>, max_age: Option<Duration>) -> Result<Self> {
        let policy = Self { max_count, max_age };
        policy.validate()?;
        Ok(policy)
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Checks that every configured limit is positive and representable.
    pub fn validate(&self) -> Result<()> {
        if self.max_count == Some(0) {
            return Err(CacheError::InvalidPolicy(
                "max_count must be a positive integer".to_string(),
            ));
        }

        if let Some(age) = self.max_age {
            if age.is_zero() {
                return Err(CacheError::InvalidPolicy(
                    "max_age must be a positive duration".to_string(),
                ));
            }
            if chrono::Duration::from_std(age).is_err() {
                return Err(CacheError::InvalidPolicy(format!(
                    "max_age of {}s is out of range",
                    age.as_secs()
                )));
            }
        }

        Ok(())
    }

    /// Returns true if entries can expire by age.
    pub fn is_time_bounded(&self) -> bool {
        self.max_age.is_some()
    }

    /// Loads a policy from environment variables.
    ///
    /// # Environment Variables
    /// - `FADING_CACHE_MAX_COUNT` - Maximum retained entries (default: unlimited)
    /// - `FADING_CACHE_MAX_AGE_SECS` - Maximum age in seconds (default: unlimited)
    ///
    /// Unparsable values are treated as absent. Call [`CachePolicy::validate`]
    /// (or build a cache) to reject zero limits.
    pub fn from_env() -> Self {
        Self {
            max_count: env::var(ENV_MAX_COUNT).ok().and_then(|v| v.parse().ok()),
            max_age: env::var(ENV_MAX_AGE_SECS)
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        }
    }
}
