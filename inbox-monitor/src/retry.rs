use crate::error::FetchError;
use std::future::Future;
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

/// Fixed-delay retry ceiling applied to every dashboard request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,                       // total, including the first try
            delay: Duration::from_millis(2000), // constant, no backoff growth
        }
    }
}

impl RetryPolicy {
    /// Attempts below 1 are raised to 1 so a request is always issued.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RETRY_ATTEMPTS")
            && let Ok(parsed) = val.parse::<u32>()
        {
            config.attempts = parsed.max(1);
        }
        if let Ok(val) = std::env::var("RETRY_DELAY_MILLIS")
            && let Ok(parsed) = val.parse()
        {
            config.delay = Duration::from_millis(parsed);
        }

        config
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Run `operation` until it succeeds or the policy's attempts run out.
///
/// Every failure is treated the same way: wait the fixed delay and try
/// again. Once the ceiling is reached the last error is returned as-is.
/// The closure receives the 1-based attempt number.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < policy.attempts => {
                warn!(
                    attempt,
                    max_attempts = policy.attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
