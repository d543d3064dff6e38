//! Bounded retry-with-delay, used for both lock acquisition and reply polling.
//!
//! The shared record store has no blocking wakeup: there is no way to sleep
//! until the lock is free or until a reply line appears.  Both waits are
//! therefore busy-polls with a fixed attempt count and a fixed delay between
//! attempts.  With the defaults (1000 attempts, 1 ms apart) each wait gives
//! up after roughly one second and the calling thread is blocked for that
//! long.  There is no cancellation.
//!
//! A transport with a real blocking primitive can ignore this type entirely
//! as long as it keeps the same overall timeout.

use std::thread;
use std::time::Duration;

/// Default number of attempts for both waits.
pub const DEFAULT_ATTEMPTS: u32 = 1000;

/// Default delay between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1);

/// How many times to try an operation and how long to sleep in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Upper bound on the time spent sleeping by [`retry`](Self::retry).
    pub fn budget(&self) -> Duration {
        self.delay * self.max_attempts.saturating_sub(1)
    }

    /// Calls `attempt` until it returns `Some` or the attempts run out.
    ///
    /// Sleeps `delay` between attempts, never after the last one.
    pub fn retry<T>(&self, mut attempt: impl FnMut() -> Option<T>) -> Option<T> {
        for n in 0..self.max_attempts {
            if let Some(value) = attempt() {
                return Some(value);
            }
            if n + 1 < self.max_attempts {
                thread::sleep(self.delay);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_thousand_one_millisecond_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 1000);
        assert_eq!(policy.delay, Duration::from_millis(1));
    }

    #[test]
    fn test_retry_returns_first_success() {
        // Arrange
        let policy = RetryPolicy::new(10, Duration::ZERO);
        let mut calls = 0;

        // Act
        let result = policy.retry(|| {
            calls += 1;
            (calls == 3).then_some(calls)
        });

        // Assert
        assert_eq!(result, Some(3));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_gives_up_after_max_attempts() {
        // Arrange
        let policy = RetryPolicy::new(5, Duration::ZERO);
        let mut calls = 0;

        // Act
        let result: Option<()> = policy.retry(|| {
            calls += 1;
            None
        });

        // Assert
        assert_eq!(result, None);
        assert_eq!(calls, 5);
    }

    #[test]
    fn test_zero_attempts_never_calls() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        let mut called = false;
        let result: Option<()> = policy.retry(|| {
            called = true;
            None
        });
        assert_eq!(result, None);
        assert!(!called);
    }

    #[test]
    fn test_budget_excludes_final_sleep() {
        let policy = RetryPolicy::new(4, Duration::from_millis(2));
        assert_eq!(policy.budget(), Duration::from_millis(6));
    }
}
