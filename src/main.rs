//! Fading Cache demo
//!
//! Memoizes a Collatz step counter under a policy read from the environment
//! and reports how the cache behaved.
//!
//! # Usage
//! `FADING_CACHE_MAX_COUNT=500 fading_cache 10000`

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fading_cache::{memoizer, CachePolicy, MemoCall, MemoReply};

const DEFAULT_UPPER_BOUND: u64 = 10_000;

/// Steps for `start` to reach 1, or `None` if the chain leaves `u64`.
fn collatz_steps(start: &u64) -> Option<u32> {
    let mut n = *start;
    let mut steps = 0u32;
    while n > 1 {
        n = if n % 2 == 0 {
            n / 2
        } else {
            n.checked_mul(3)?.checked_add(1)?
        };
        steps = steps.checked_add(1)?;
    }
    Some(steps)
}

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fading_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fading cache demo");

    let policy = CachePolicy::from_env();
    info!(
        "Policy loaded: max_count={:?}, max_age={:?}",
        policy.max_count, policy.max_age
    );

    let upper_bound = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u64>())
        .transpose()
        .context("upper bound must be a positive integer")?
        .unwrap_or(DEFAULT_UPPER_BOUND);

    let mut steps = memoizer::<u64, Option<u32>, _>(policy, collatz_steps)
        .context("invalid cache policy")?;

    let mut longest = (1, 0);
    let mut overflowed = 0u64;
    for round in 1..=2 {
        for n in 1..=upper_bound {
            match steps.call(n) {
                Some(count) if count > longest.1 => longest = (n, count),
                Some(_) => {}
                None if round == 1 => overflowed += 1,
                None => {}
            }
        }
        info!("Round {} complete", round);
    }

    if overflowed > 0 {
        warn!("{} chains exceeded u64 and were skipped", overflowed);
    }

    info!(
        "Longest chain up to {}: start={}, steps={}",
        upper_bound, longest.0, longest.1
    );

    if let MemoReply::Size(size) = steps.invoke(MemoCall::ReportSize) {
        info!("Results retained: {}", size);
    }

    let stats = steps.cache().stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    steps.invoke(MemoCall::Clear);
    info!("Demo complete");
    Ok(())
}
