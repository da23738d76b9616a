//! Retry policies for whole units of work.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::Error;

/// Decides whether a failed unit of work is re-run.
///
/// Only consulted when the connection had no ambient transaction, since a
/// retry inside someone else's transaction cannot undo their earlier work.
pub trait RetryPolicy: Send + Sync {
    /// Delay before attempt `attempt + 1`, or `None` to give up.
    /// `attempt` is 1 for the first failure.
    fn next_delay(&self, attempt: u32, error: &Error) -> Option<Duration>;
}

/// Never retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn next_delay(&self, _attempt: u32, _error: &Error) -> Option<Duration> {
        None
    }
}

/// Retry transient errors with exponential backoff: `initial`, `2 * initial`,
/// ... capped at `max`, for at most `max_attempts` attempts in total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientRetry {
    pub max_attempts: u32,
    pub initial: Duration,
    pub max: Duration,
}

impl TransientRetry {
    pub fn new(max_attempts: u32, initial: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            initial,
            max,
        }
    }
}

impl Default for TransientRetry {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(10), Duration::from_secs(1))
    }
}

impl From<&RetryConfig> for TransientRetry {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.initial_backoff(),
            config.max_backoff(),
        )
    }
}

impl RetryPolicy for TransientRetry {
    fn next_delay(&self, attempt: u32, error: &Error) -> Option<Duration> {
        if attempt >= self.max_attempts || !error.is_transient() {
            return None;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        Some(self.initial.saturating_mul(factor).min(self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy() -> Error {
        Error::backend("database is locked", true)
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = TransientRetry::new(10, Duration::from_millis(10), Duration::from_millis(50));
        let delays: Vec<_> = (1..=4)
            .map(|a| policy.next_delay(a, &busy()).unwrap().as_millis())
            .collect();
        assert_eq!(delays, vec![10, 20, 40, 50]);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let policy = TransientRetry::new(3, Duration::from_millis(1), Duration::from_millis(5));
        assert!(policy.next_delay(2, &busy()).is_some());
        assert!(policy.next_delay(3, &busy()).is_none());
    }

    #[test]
    fn test_permanent_errors_not_retried() {
        let policy = TransientRetry::default();
        assert!(policy.next_delay(1, &Error::NotFound).is_none());
        assert!(NoRetry.next_delay(1, &busy()).is_none());
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let policy = TransientRetry::new(u32::MAX, Duration::from_millis(1), Duration::from_secs(2));
        assert_eq!(policy.next_delay(64, &busy()), Some(Duration::from_secs(2)));
    }
}
