// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Retry policy applied to secure channel and session (re)establishment.

use std::time::Duration;

use opcua_types::StatusCode;

/// Decides whether and how long to wait before retrying a failed session or
/// secure channel operation, using exponential backoff with a ceiling.
#[derive(Debug, Clone)]
pub struct SessionRetryPolicy {
    max_delay: Duration,
    retry_limit: Option<u32>,
    initial_delay: Duration,
}

impl SessionRetryPolicy {
    /// Default number of retries before giving up, when no explicit limit
    /// is configured.
    pub const DEFAULT_RETRY_LIMIT: u32 = 10;

    /// Creates a policy with the given ceiling, retry count limit
    /// (`None` for unlimited), and initial delay.
    pub fn new(max_delay: Duration, retry_limit: Option<u32>, initial_delay: Duration) -> Self {
        Self {
            max_delay,
            retry_limit,
            initial_delay,
        }
    }

    /// A policy that retries forever with a 1s initial delay and 30s cap.
    pub fn default_immediate() -> Self {
        Self::new(Duration::from_secs(30), None, Duration::from_secs(1))
    }

    /// The delay to wait before attempt number `attempt` (1-based),
    /// doubling each time up to the ceiling, or `None` if the retry limit
    /// has been exhausted.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if let Some(limit) = self.retry_limit {
            if attempt > limit {
                return None;
            }
        }
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let delay = self
            .initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay);
        Some(delay.min(self.max_delay))
    }

    /// True if a service call failing with `status` should be retried at
    /// all (as opposed to surfaced to the caller immediately).
    pub fn should_retry(&self, status: StatusCode) -> bool {
        status.is_transient()
    }
}

impl Default for SessionRetryPolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(30),
            Some(Self::DEFAULT_RETRY_LIMIT),
            Duration::from_secs(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_up_to_ceiling() {
        let policy = SessionRetryPolicy::new(Duration::from_secs(8), None, Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_for_attempt(3), Some(Duration::from_secs(4)));
        assert_eq!(policy.delay_for_attempt(4), Some(Duration::from_secs(8)));
        assert_eq!(policy.delay_for_attempt(5), Some(Duration::from_secs(8)));
    }

    #[test]
    fn retry_limit_is_enforced() {
        let policy = SessionRetryPolicy::new(Duration::from_secs(8), Some(2), Duration::from_secs(1));
        assert!(policy.delay_for_attempt(2).is_some());
        assert!(policy.delay_for_attempt(3).is_none());
    }

    #[test]
    fn transient_status_is_retried() {
        let policy = SessionRetryPolicy::default();
        assert!(policy.should_retry(StatusCode::BadTimeout));
        assert!(!policy.should_retry(StatusCode::BadNodeIdInvalid));
    }
}
