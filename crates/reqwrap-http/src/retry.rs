//! Whole-call retry policy.

use crate::descriptor::CallOptions;
use crate::error::RequestError;

/// Retries allowed when a call enables auto retry without a limit.
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Issue the call again.
    Retry,
    /// Return the error unchanged.
    Propagate,
    /// Give up and report the retry limit.
    Exhausted,
}

/// Retry policy derived from call options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt; `None` disables retry.
    limit: Option<u32>,
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn disabled() -> Self {
        Self { limit: None }
    }

    /// Policy allowing `limit` retries after the first attempt.
    pub fn with_limit(limit: u32) -> Self {
        Self { limit: Some(limit) }
    }

    /// Policy for `options`, using `default_limit` when no limit is set.
    pub fn from_options(options: &CallOptions, default_limit: u32) -> Self {
        if options.auto_retry {
            Self::with_limit(options.auto_retry_limit.unwrap_or(default_limit))
        } else {
            Self::disabled()
        }
    }

    /// Whether retries are allowed at all.
    pub fn is_enabled(&self) -> bool {
        self.limit.is_some()
    }

    /// Upper bound on attempts for one call.
    pub fn max_attempts(&self) -> u32 {
        self.limit.map_or(1, |limit| limit.saturating_add(1))
    }

    /// Decide after attempt number `attempt` (starting at 1) failed with `error`.
    pub fn decide(&self, attempt: u32, error: &RequestError) -> RetryDecision {
        if !error.is_classified() {
            return RetryDecision::Propagate;
        }

        match self.limit {
            None => RetryDecision::Propagate,
            Some(_) if attempt < self.max_attempts() => RetryDecision::Retry,
            Some(_) => RetryDecision::Exhausted,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn business() -> RequestError {
        RequestError::business(json!({"data": null, "msg": "busy", "type": 500}))
    }

    fn decode() -> RequestError {
        RequestError::Decode {
            status: 200,
            body: "<html>".to_string(),
            source: serde_json::from_str::<Value>("<html>").unwrap_err(),
        }
    }

    #[test]
    fn test_disabled_propagates() {
        let policy = RetryPolicy::disabled();
        assert!(!policy.is_enabled());
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.decide(1, &business()), RetryDecision::Propagate);
    }

    #[test]
    fn test_retries_until_limit() {
        let policy = RetryPolicy::with_limit(2);
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.decide(1, &business()), RetryDecision::Retry);
        assert_eq!(policy.decide(2, &business()), RetryDecision::Retry);
        assert_eq!(policy.decide(3, &business()), RetryDecision::Exhausted);
    }

    #[test]
    fn test_zero_limit_exhausts_immediately() {
        let policy = RetryPolicy::with_limit(0);
        assert!(policy.is_enabled());
        assert_eq!(policy.decide(1, &business()), RetryDecision::Exhausted);
    }

    #[test]
    fn test_unclassified_errors_bypass_retry() {
        let policy = RetryPolicy::with_limit(5);
        assert_eq!(policy.decide(1, &decode()), RetryDecision::Propagate);
    }

    #[test]
    fn test_from_options() {
        let options = CallOptions::default();
        assert_eq!(RetryPolicy::from_options(&options, 3), RetryPolicy::disabled());

        let options = CallOptions::default().auto_retry(None);
        assert_eq!(RetryPolicy::from_options(&options, 4), RetryPolicy::with_limit(4));

        let options = CallOptions::default().auto_retry(Some(1));
        assert_eq!(RetryPolicy::from_options(&options, 4), RetryPolicy::with_limit(1));

        // A limit without auto retry does nothing
        let mut options = CallOptions::default();
        options.auto_retry_limit = Some(9);
        assert!(!RetryPolicy::from_options(&options, 4).is_enabled());
    }

    #[test]
    fn test_saturating_max_attempts() {
        assert_eq!(RetryPolicy::with_limit(u32::MAX).max_attempts(), u32::MAX);
    }
}
