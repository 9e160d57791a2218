//! Retry policy for remote calls.
//!
//! Every remote call the sync core makes runs through one [`RetryPolicy`]:
//! a bounded number of attempts separated by a fixed, blocking back-off, and
//! a set of failure categories that are worth another attempt.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::remote::{ErrorCategory, RemoteError, RemoteResult};
use crate::sync::report::{SyncEvent, SyncReporter};

/// Default number of attempts per call (the first try plus one retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Default pause between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// How remote calls are retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts per call, including the first. Values below 1 count as 1.
    pub max_attempts: u32,
    /// Blocking pause before each retry.
    #[serde(with = "millis")]
    pub delay: Duration,
    /// Failure categories that trigger a retry.
    pub retryable: Vec<ErrorCategory>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
            retryable: ErrorCategory::ALL.to_vec(),
        }
    }
}

/// A call that failed on its last allowed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted {
    /// Attempts made.
    pub attempts: u32,
    /// Error of the final attempt.
    pub error: RemoteError,
}

impl RetryPolicy {
    /// Policy that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Retry only the given categories.
    #[must_use]
    pub fn retrying_only(mut self, categories: &[ErrorCategory]) -> Self {
        self.retryable = categories.to_vec();
        self
    }

    /// Whether `error` is worth another attempt.
    #[must_use]
    pub fn is_retryable(&self, error: &RemoteError) -> bool {
        self.retryable.contains(&error.category())
    }

    /// Run `call` until it succeeds, fails with a non-retryable error, or
    /// runs out of attempts. `call` receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns [`RetryExhausted`] with the last error if no attempt succeeded.
    pub fn run<T, F>(
        &self,
        operation: &str,
        reporter: &dyn SyncReporter,
        mut call: F,
    ) -> Result<T, RetryExhausted>
    where
        F: FnMut(u32) -> RemoteResult<T>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match call(attempt) {
                Ok(value) => return Ok(value),
                Err(error) if attempt < max_attempts && self.is_retryable(&error) => {
                    tracing::debug!(
                        operation,
                        attempt,
                        category = %error.category(),
                        "Remote call failed, retrying"
                    );
                    reporter.report(SyncEvent::RetryScheduled {
                        operation: operation.to_string(),
                        attempt,
                        delay: self.delay,
                        error: error.to_string(),
                    });
                    if !self.delay.is_zero() {
                        std::thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
                Err(error) => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        error,
                    });
                }
            }
        }
    }
}

/// Serialize a `Duration` as whole milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
