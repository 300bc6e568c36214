//! Retry delays for failed render cycles.

use std::time::Duration;

/// Default delay after the first failed cycle (2 seconds).
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 2_000;

/// Default delay cap (60 seconds).
pub const DEFAULT_MAX_DELAY_SECS: u64 = 60;

/// Default growth factor between consecutive failures.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Exponential backoff schedule.
///
/// The delay before retry `n` (1-based) is
/// `initial_delay * multiplier^(n-1)`, capped at `max_delay`.
#[derive(Clone, Debug, PartialEq)]
pub struct Backoff {
    /// Delay after the first failure.
    pub initial_delay: Duration,
    /// Maximum delay cap (delay won't exceed this).
    pub max_delay: Duration,
    /// Multiplier applied after each further failure.
    pub multiplier: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl Backoff {
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }

    /// Calculates the delay for a given consecutive failure count.
    ///
    /// # Arguments
    ///
    /// * `attempt` - Consecutive failures so far (1 = first failure)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.multiplier.powi(exponent);
        let delay_ms = self.initial_delay.as_millis() as f64 * factor;
        let capped = delay_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_secs(8));
        assert_eq!(backoff.delay_for_attempt(5), Duration::from_secs(32));
        assert_eq!(backoff.delay_for_attempt(6), Duration::from_secs(60));
    }

    #[test]
    fn test_cap_holds_for_huge_attempts() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay_for_attempt(u32::MAX), Duration::from_secs(60));
    }

    #[test]
    fn test_attempt_zero_uses_initial_delay() {
        let backoff = Backoff::new(Duration::from_millis(250), Duration::from_secs(1));
        assert_eq!(backoff.delay_for_attempt(0), Duration::from_millis(250));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_delay_is_monotonic_and_capped(
                initial_ms in 1u64..5_000,
                max_secs in 1u64..120,
                attempt in 1u32..64
            ) {
                let backoff = Backoff::new(
                    Duration::from_millis(initial_ms),
                    Duration::from_secs(max_secs),
                );
                let current = backoff.delay_for_attempt(attempt);
                let next = backoff.delay_for_attempt(attempt + 1);
                prop_assert!(next >= current);
                prop_assert!(current <= backoff.max_delay);
            }
        }
    }
}
