//! Poll spacing with exponential growth and jitter.

use rand::Rng;
use std::time::Duration;

use crate::config::PollingConfig;

/// Delay before poll number `attempt` (0-based).
///
/// The first poll runs immediately. Afterwards the delay doubles from
/// `interval_ms`, is capped at `max_interval_ms`, and gains up to 10%
/// jitter on top.
pub fn poll_delay(attempt: u32, config: &PollingConfig) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u64.saturating_pow(attempt - 1);
    let capped = config
        .interval_ms
        .saturating_mul(factor)
        .min(config.max_interval_ms);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}
