//! Reconnect policy
//!
//! Chooses the wait before each reconnect attempt. Attempts never stop;
//! the count only feeds the exponential strategy and resets once a session
//! is READY or RESUMED.

use std::time::Duration;

use loyalty_common::{ReconnectConfig, ReconnectStrategy};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    strategy: ReconnectStrategy,
    base: Duration,
    max: Duration,
    invalid_session: Duration,
    attempts: u32,
}

impl ReconnectPolicy {
    #[must_use]
    pub fn new(config: &ReconnectConfig) -> Self {
        Self {
            strategy: config.strategy,
            base: config.delay(),
            max: config.max_delay().max(config.delay()),
            invalid_session: config.invalid_session_delay(),
            attempts: 0,
        }
    }

    /// Constant delay before every attempt
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self {
            strategy: ReconnectStrategy::Fixed,
            base: delay,
            max: delay,
            invalid_session: delay,
            attempts: 0,
        }
    }

    /// Delay before the next attempt after a close or transport failure
    pub fn next_delay(&mut self) -> Duration {
        let attempt = self.attempts;
        self.attempts = self.attempts.saturating_add(1);

        match self.strategy {
            ReconnectStrategy::Fixed => self.base,
            ReconnectStrategy::Exponential => {
                let ceiling = self
                    .base
                    .checked_mul(1u32 << attempt.min(16))
                    .map_or(self.max, |d| d.min(self.max));
                jitter(ceiling)
            }
        }
    }

    /// Delay before a fresh Identify after Invalid Session (op 9)
    #[must_use]
    pub fn invalid_session_delay(&self) -> Duration {
        self.invalid_session
    }

    /// Forget previous failures
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Pick uniformly from [ceiling/2, ceiling]
fn jitter(ceiling: Duration) -> Duration {
    let half = ceiling / 2;
    let spread = (ceiling - half).as_millis() as u64;
    if spread == 0 {
        return ceiling;
    }
    half + Duration::from_millis(rand::thread_rng().gen_range(0..=spread))
}
