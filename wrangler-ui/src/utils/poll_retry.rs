//! Bounded fixed-interval polling
//!
//! Used by long-poll endpoints that wait on the engine server-side. The policy
//! is deliberately simple: sleep, attempt, repeat, give up after
//! `max_attempts`. No backoff and no retry of failed attempts; an attempt that
//! errors ends the loop immediately.

use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Result of one polling attempt
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// Finished; stop polling
    Ready(T),
    /// Not yet; poll again after the interval
    Pending,
}

/// Fixed-interval polling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep before each attempt
    pub interval: Duration,
    /// Attempts before giving up
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound on time spent sleeping
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Why polling stopped without a ready value
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// All attempts came back pending
    #[error("gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// An attempt failed; polling stops at the first failure
    #[error("attempt {attempt} failed: {source}")]
    Failed {
        attempt: u32,
        #[source]
        source: E,
    },
}

/// Poll `operation` until it is ready, it fails, or attempts run out
///
/// # Arguments
/// * `operation_name` - Name for logging (e.g. "lyrics generation")
/// * `policy` - Interval and attempt limit
/// * `operation` - Async closure performing one attempt
pub async fn poll_until_ready<F, Fut, T, E>(
    operation_name: &str,
    policy: PollPolicy,
    mut operation: F,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollOutcome<T>, E>>,
    E: std::error::Error + 'static,
{
    let start_time = Instant::now();

    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;

        match operation().await {
            Ok(PollOutcome::Ready(value)) => {
                tracing::debug!(
                    operation = operation_name,
                    attempt,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    "Polling finished"
                );
                return Ok(value);
            }
            Ok(PollOutcome::Pending) => {
                tracing::trace!(operation = operation_name, attempt, "Still pending");
            }
            Err(source) => {
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    error = %source,
                    "Polling attempt failed"
                );
                return Err(PollError::Failed { attempt, source });
            }
        }
    }

    tracing::warn!(
        operation = operation_name,
        attempts = policy.max_attempts,
        elapsed_ms = start_time.elapsed().as_millis(),
        "Polling gave up: max attempts reached"
    );
    Err(PollError::Exhausted {
        attempts: policy.max_attempts,
    })
}
