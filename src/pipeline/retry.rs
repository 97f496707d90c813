use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::transform::BatchTransform;

type RetryPredicate = Arc<dyn Fn(&Error) -> bool + Send + Sync>;

/// Batch-granular retry with a fixed delay between attempts.
///
/// One failing record retries the whole batch. A count mismatch between the
/// input and the returned texts is always a retryable failure; other errors
/// are retried when the `retry_if` predicate accepts them (by default,
/// [`Error::is_transient`]).
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    retry_if: RetryPredicate,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: Duration::from_secs(10),
            retry_if: Arc::new(Error::is_transient),
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn retry_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Error) -> bool + Send + Sync + 'static,
    {
        self.retry_if = Arc::new(predicate);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn retry_delay(&self) -> Duration {
        self.delay
    }

    /// Turn one attempt's raw result into a retry decision.
    pub fn classify(&self, expected: usize, result: Result<Vec<String>>) -> AttemptOutcome {
        match result {
            Ok(texts) if texts.len() == expected => AttemptOutcome::Success(texts),
            Ok(texts) => AttemptOutcome::TransientFailure(Error::BatchSizeMismatch {
                expected,
                actual: texts.len(),
            }),
            Err(err) if (self.retry_if)(&err) => AttemptOutcome::TransientFailure(err),
            Err(err) => AttemptOutcome::PermanentFailure(err),
        }
    }

    /// Attempt `texts` until the transform returns one output per input, a
    /// permanent failure shows up, or the attempts run out.
    pub async fn run<B>(&self, _batch: usize, texts: &[String], transform: &mut B) -> BatchOutcome
    where
        B: BatchTransform + ?Sized,
    {
        let mut attempt = 1u32;

        loop {
            let result = transform.transform_batch(texts).await;

            let error = match self.classify(texts.len(), result) {
                AttemptOutcome::Success(transformed) => {
                    return BatchOutcome::Committed {
                        transformed,
                        attempts: attempt,
                    }
                }
                AttemptOutcome::PermanentFailure(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::event!(
                        tracing::Level::ERROR,
                        event = "rephrase.retry.exhausted",
                        batch = _batch,
                        attempts = attempt,
                        retryable = false,
                        error = %error,
                        "rephrase.retry.exhausted"
                    );
                    return BatchOutcome::Failed {
                        attempts: attempt,
                        reason: error,
                    };
                }
                AttemptOutcome::TransientFailure(error) => error,
            };

            #[cfg(feature = "tracing")]
            tracing::event!(
                tracing::Level::WARN,
                event = "rephrase.retry.attempt_failed",
                batch = _batch,
                attempt = attempt,
                max_attempts = self.max_attempts,
                error = %error,
                "rephrase.retry.attempt_failed"
            );

            if attempt >= self.max_attempts {
                #[cfg(feature = "tracing")]
                tracing::event!(
                    tracing::Level::ERROR,
                    event = "rephrase.retry.exhausted",
                    batch = _batch,
                    attempts = attempt,
                    retryable = true,
                    error = %error,
                    "rephrase.retry.exhausted"
                );
                return BatchOutcome::Failed {
                    attempts: attempt,
                    reason: error,
                };
            }

            if !self.delay.is_zero() {
                #[cfg(feature = "tracing")]
                tracing::event!(
                    tracing::Level::WARN,
                    event = "rephrase.retry.sleep",
                    batch = _batch,
                    attempt = attempt,
                    delay_ms = self.delay.as_millis() as u64,
                    "rephrase.retry.sleep"
                );
                tokio::time::sleep(self.delay).await;
            }

            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Result of a single batch attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Vec<String>),
    TransientFailure(Error),
    PermanentFailure(Error),
}

/// Result of running a batch through the whole policy.
#[derive(Debug)]
pub enum BatchOutcome {
    Committed { transformed: Vec<String>, attempts: u32 },
    Failed { attempts: u32, reason: Error },
}

impl BatchOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Committed { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}
