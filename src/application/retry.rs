//! Bounded exponential retry for repository and network calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use metrics::counter;
use tracing::warn;

const METRIC_RETRY_ATTEMPTS: &str = "clientbooks_retry_attempts_total";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_factor(2.0)
            .with_max_times(self.max_retries)
    }

    /// Run `attempt` until it succeeds, `should_retry` rejects the error, or the retry budget
    /// is spent. The last error is returned unchanged.
    pub async fn run<T, E, F, Fut, P>(
        &self,
        operation: &'static str,
        attempt: F,
        should_retry: P,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: FnMut(&E) -> bool,
    {
        attempt
            .retry(self.backoff())
            .when(should_retry)
            .notify(|err: &E, delay: Duration| {
                counter!(METRIC_RETRY_ATTEMPTS, "operation" => operation).increment(1);
                warn!(
                    target: "clientbooks::application::retry",
                    operation,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "operation failed, retrying"
                );
            })
            .await
    }
}
