// ABOUTME: Bounded-attempt retry with a fixed inter-attempt delay.
// ABOUTME: Classifies errors retryable/fatal; used for polling and RMW cycles.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::time::Duration;

/// Error returned by [`RetryPolicy::run`], distinguishing a definitive
/// rejection from an exhausted attempt budget.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E: Display + Debug> {
    /// The classifier rejected the error; it was returned immediately.
    #[error("{0}")]
    Rejected(E),

    /// All attempts were consumed; carries the last error seen.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

impl<E: Display + Debug> RetryError<E> {
    /// The underlying error, regardless of how the retry ended.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Rejected(e) => e,
            RetryError::Exhausted { last, .. } => last,
        }
    }
}

/// Bounded-attempt retry with a fixed delay between attempts.
///
/// No exponential backoff: the remote operations this polls (staging
/// completion, workload readiness, load-balancer assignment) settle on their
/// own schedule, so the budget is attempt-count × delay rather than a wall
/// clock.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds, the classifier rejects its error, or the
    /// attempt budget is exhausted. A retry notification is emitted before
    /// every delay.
    pub async fn run<T, E, F, Fut, P>(
        &self,
        operation: &str,
        mut op: F,
        is_retryable: P,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display + Debug,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !is_retryable(&err) {
                        return Err(RetryError::Rejected(err));
                    }
                    if attempt >= self.max_attempts {
                        return Err(RetryError::Exhausted {
                            attempts: self.max_attempts,
                            last: err,
                        });
                    }
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "retrying after error"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
