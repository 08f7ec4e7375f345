//! Retry with random exponential backoff around any [`Oracle`].

use crate::error::{OracleError, Result};
use crate::message::{AssistantReply, ChatRequest};
use crate::Oracle;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// Backoff envelope applied to every oracle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,

    /// Total attempts, including the first one
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_attempts: 6,
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_attempts,
        }
    }

    /// Upper bound of the wait after the given failed attempt (0-based):
    /// `2^attempt` seconds clamped into `[min_delay, max_delay]`.
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let exp = Duration::from_secs(1u64 << attempt.min(32));
        exp.clamp(self.min_delay, self.max_delay.max(self.min_delay))
    }

    /// Wait after the given failed attempt, uniform in `[min_delay, ceiling]`
    pub fn delay(&self, attempt: u32) -> Duration {
        let ceiling = self.ceiling(attempt);
        if ceiling <= self.min_delay {
            return ceiling;
        }
        let mut rng = rand::thread_rng();
        let millis = rng.gen_range(self.min_delay.as_millis()..=ceiling.as_millis());
        Duration::from_millis(millis as u64)
    }
}

/// Wraps an oracle so that transient failures are retried.
///
/// Permanent failures are returned at once; when every attempt fails the
/// last error is wrapped in [`OracleError::Exhausted`].
pub struct RetryingOracle<O> {
    inner: O,
    policy: RetryPolicy,
}

impl<O: Oracle> RetryingOracle<O> {
    pub fn new(inner: O, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

#[async_trait]
impl<O: Oracle> Oracle for RetryingOracle<O> {
    async fn chat(&self, request: &ChatRequest) -> Result<AssistantReply> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let error = match self.inner.chat(request).await {
                Ok(reply) => {
                    if attempt > 0 {
                        log::info!("Oracle request succeeded after {} retries", attempt);
                    }
                    return Ok(reply);
                }
                Err(error) => error,
            };

            if !error.is_transient() {
                log::warn!("Non-retryable oracle error: {error}");
                return Err(error);
            }

            attempt += 1;
            if attempt >= max_attempts {
                log::warn!("Oracle request failed after {max_attempts} attempts: {error}");
                return Err(OracleError::Exhausted {
                    attempts: max_attempts,
                    last: Box::new(error),
                });
            }

            let delay = self.policy.delay(attempt - 1);
            log::warn!(
                "Oracle request failed (attempt {}/{}): {}. Retrying in {:.2}s...",
                attempt,
                max_attempts,
                error,
                delay.as_secs_f64()
            );
            sleep(delay).await;
        }
    }
}
