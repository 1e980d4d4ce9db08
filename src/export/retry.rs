//! Bounded retry policy for page exports
//!
//! Every export failure is treated as transient: the whole attempt (fresh
//! session, navigation, render) is repeated after a fixed backoff until the
//! attempt budget runs out.

use std::time::Duration;

/// Maximum export attempts per page, including the first
pub const MAX_RETRIES: u32 = 3;

/// Pause between a failed attempt and the next one
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Decision after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after `delay`
    Retry { delay: Duration },
    /// The attempt budget is spent
    GiveUp,
}

/// Fixed-backoff retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is raised to at least 1
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides what to do after `attempt` (1-indexed) has failed
    #[must_use]
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt < self.max_attempts {
            RetryDecision::Retry {
                delay: self.backoff,
            }
        } else {
            RetryDecision::GiveUp
        }
    }
}
