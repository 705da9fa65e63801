//! Bounded retry with a fixed delay between attempts.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::obs::emit_retry_attempt;

/// Attempt budget and pause length for [`retry_when`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of calls, including the first.
    pub max_attempts: u32,
    /// Pause between two consecutive calls.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Run `op` until it succeeds, fails with an error `is_recoverable` rejects,
/// or `policy.max_attempts` calls have been made.
///
/// `op` receives the 1-based attempt number. A zero budget still makes one
/// call. After the last attempt the last error is returned unchanged.
pub async fn retry_when<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_recoverable: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && is_recoverable(&err) => {
                emit_retry_attempt(attempt, max_attempts, &err);
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
