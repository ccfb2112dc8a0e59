//! Delay between upstream connection attempts.
//!
//! The wait doubles with each refused attempt, stops growing at
//! `retries.max_delay_ms`, and gets a random extra of up to a tenth so that
//! requests queued behind the same dead upstream spread out.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// How long to sleep after failed attempt number `attempt` (1-based).
/// Attempt 0 has not failed yet and waits nothing.
pub fn calculate_backoff(attempt: u32, config: &RetryConfig) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u64.saturating_pow(attempt - 1);
    let capped = config
        .base_delay_ms
        .saturating_mul(factor)
        .min(config.max_delay_ms);

    // Spread up to a tenth of the delay.
    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}
