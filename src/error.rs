//! Error types for the fading cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the fading cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key absent, expired, or evicted with nobody else holding it
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Policy rejected at construction time
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),
}

impl CacheError {
    /// Builds a `NotFound` from any debuggable key.
    pub fn not_found<Q: std::fmt::Debug + ?Sized>(key: &Q) -> Self {
        CacheError::NotFound(format!("{:?}", key))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the fading cache.
pub type Result<T> = std::result::Result<T, CacheError>;
