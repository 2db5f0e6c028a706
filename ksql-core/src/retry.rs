use crate::{Error, ErrorKind, Result};
use std::{collections::HashSet, future::Future, time::Duration};

/// Kinds retried around create-as submissions.
pub const CREATE_AS_RETRYABLE: [ErrorKind; 2] = [ErrorKind::Timeout, ErrorKind::Create];

/// Re-invokes an operation that failed with one of a fixed set of transient
/// error kinds.
///
/// Attempt 1 runs immediately, every following attempt waits `delay` first.
/// Errors of other kinds are returned on first occurrence. When the budget is
/// exhausted the last error is returned unchanged. A policy holds no state
/// between calls to [`RetryPolicy::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    retryable: HashSet<ErrorKind>,
    delay: Duration,
    max_attempts: u32,
}

impl RetryPolicy {
    /// A `max_attempts` of zero behaves like one: the operation always runs once.
    pub fn new(
        retryable: impl IntoIterator<Item = ErrorKind>,
        delay: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            retryable: retryable.into_iter().collect(),
            delay,
            max_attempts: max_attempts.max(1),
        }
    }
    pub fn delay(&self) -> Duration {
        self.delay
    }
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
    pub fn is_retryable(&self, error: &Error) -> bool {
        ErrorKind::of(error).is_some_and(|kind| self.retryable.contains(&kind))
    }

    /// Run `operation` until it succeeds, fails with a non retryable error or
    /// the attempts run out.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts && self.is_retryable(&error) => {
                    log::debug!(
                        "Attempt {}/{} failed, retrying in {:?}: {:#}",
                        attempt,
                        self.max_attempts,
                        self.delay,
                        error
                    );
                    attempt += 1;
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Shorthand for [`RetryPolicy::new`] followed by [`RetryPolicy::run`].
pub async fn retry<T, F, Fut>(
    retryable: impl IntoIterator<Item = ErrorKind>,
    delay: Duration,
    max_attempts: u32,
    operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    RetryPolicy::new(retryable, delay, max_attempts)
        .run(operation)
        .await
}
