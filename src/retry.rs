use std::time::Duration;

use crate::{transport::FailureKind, ClientOptions};

/// Maximum number of retries after the initial attempt.
pub const MAX_RETRIES: usize = 5;

/// Linear backoff step, in milliseconds, added per retry.
pub const DELAY_INCREASE_MS: u64 = 1_000;

/// Outcome of a [`RetryPolicy::decide`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryDecision {
    pub should_retry: bool,
    pub delay_ms: u64,
}

impl RetryDecision {
    const GIVE_UP: Self = Self {
        should_retry: false,
        delay_ms: 0,
    };

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Decides whether a failed attempt is retried and how long to wait.
///
/// Only connect failures are retried, with a linear backoff of
/// `delay_increase_ms * (attempt + 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: usize,
    delay_increase_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay_increase_ms: u64) -> Self {
        Self {
            max_retries,
            delay_increase_ms,
        }
    }

    /// Same retry budget as the default policy, but never sleeps.
    pub fn without_delay() -> Self {
        Self::new(MAX_RETRIES, 0)
    }

    /// Never retries.
    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// `attempt` is zero-based: the first attempt is `0`.
    pub fn decide(&self, attempt: usize, failure: FailureKind) -> RetryDecision {
        if attempt >= self.max_retries || failure != FailureKind::ConnectFailure {
            return RetryDecision::GIVE_UP;
        }

        let step = u64::try_from(attempt).unwrap_or(u64::MAX).saturating_add(1);
        RetryDecision {
            should_retry: true,
            delay_ms: self.delay_increase_ms.saturating_mul(step),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES, DELAY_INCREASE_MS)
    }
}

impl From<&ClientOptions> for RetryPolicy {
    fn from(options: &ClientOptions) -> Self {
        Self::new(options.max_retries, options.retry_delay_increase_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{RetryPolicy, MAX_RETRIES};
    use crate::transport::FailureKind;

    const ALL_KINDS: [FailureKind; 3] = [
        FailureKind::ConnectFailure,
        FailureKind::OtherTransportFailure,
        FailureKind::None,
    ];

    #[test]
    fn never_retries_once_budget_is_spent() {
        let policy = RetryPolicy::default();
        for attempt in MAX_RETRIES..MAX_RETRIES + 10 {
            for kind in ALL_KINDS {
                assert!(!policy.decide(attempt, kind).should_retry);
            }
        }
    }

    #[test]
    fn only_connect_failures_are_retried() {
        let policy = RetryPolicy::default();
        for attempt in 0..MAX_RETRIES {
            assert!(policy.decide(attempt, FailureKind::ConnectFailure).should_retry);
            assert!(!policy.decide(attempt, FailureKind::OtherTransportFailure).should_retry);
            assert!(!policy.decide(attempt, FailureKind::None).should_retry);
        }
    }

    #[test]
    fn default_delay_grows_linearly() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (0..MAX_RETRIES)
            .map(|attempt| policy.decide(attempt, FailureKind::ConnectFailure).delay_ms)
            .collect();
        assert_eq!(delays, vec![1_000, 2_000, 3_000, 4_000, 5_000]);
        assert!(delays.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn deterministic_mode_has_zero_delay() {
        let policy = RetryPolicy::without_delay();
        for attempt in 0..MAX_RETRIES {
            let decision = policy.decide(attempt, FailureKind::ConnectFailure);
            assert!(decision.should_retry);
            assert_eq!(decision.delay_ms, 0);
        }
    }

    #[test]
    fn disabled_policy_gives_up_immediately() {
        let decision = RetryPolicy::disabled().decide(0, FailureKind::ConnectFailure);
        assert!(!decision.should_retry);
    }
}
