use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum RetryStrategy {
    ExponentialBackoff,
    LinearBackoff,
    FixedDelay,
}

/// Bounds for the delivery controller's retry loop. Retries stop once either
/// `max_attempts` sends have been made or `max_elapsed` wall time has passed
/// since the first attempt.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_elapsed: Duration,
    pub strategy: RetryStrategy,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
            max_elapsed: Duration::from_secs(300),
            strategy: RetryStrategy::ExponentialBackoff,
            jitter: true,
        }
    }
}

/// Pure delay calculator. All attempt counting lives with the caller, so a
/// policy can be shared across concurrent sends without synchronization.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Delay before retry number `attempt` (zero-based: the first retry
    /// waits `base_delay` under exponential backoff).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_delay = match self.config.strategy {
            RetryStrategy::ExponentialBackoff => {
                let multiplier = 2_u64.saturating_pow(attempt);
                Duration::from_millis(
                    (self.config.base_delay.as_millis() as u64).saturating_mul(multiplier),
                )
            }
            RetryStrategy::LinearBackoff => Duration::from_millis(
                (self.config.base_delay.as_millis() as u64).saturating_mul(attempt as u64 + 1),
            ),
            RetryStrategy::FixedDelay => self.config.base_delay,
        };

        // Apply maximum delay cap
        let capped_delay = std::cmp::min(base_delay, self.config.max_delay);

        // Apply jitter if enabled
        if self.config.jitter {
            apply_jitter(capped_delay)
        } else {
            capped_delay
        }
    }
}

fn apply_jitter(delay: Duration) -> Duration {
    let mut rng = rand::rng();
    let jitter_factor = rng.random_range(0.5..1.5); // ±50% jitter
    let jittered_millis = (delay.as_millis() as f64 * jitter_factor) as u64;
    Duration::from_millis(jittered_millis)
}
