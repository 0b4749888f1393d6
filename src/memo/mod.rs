//! Memoization Module
//!
//! Function memoization on top of the fading cache.
//!
//! # Sentinels
//! - `ReportSize`: returns the number of retained results
//! - `Clear`: drops every result and every weak binding

mod key;
mod memoizer;

pub use key::CallKey;
pub use memoizer::{
    memo, memo_until, memoizer, nmemo, MemoCall, MemoReply, Memoized, CLEAR_SENTINEL, SIZE_SENTINEL,
};
