use std::future::Future;
use std::time::Duration;
use async_trait::async_trait;
use tracing::warn;
use crate::error_utils::{classify_error, ErrorCategory};
use crate::errors::Result;

/// Backoff policy for the initial connection
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Growth factor applied while the delay is still growing
    pub backoff_multiplier: u32,
    /// Number of retries whose delay grows before settling on `max_delay`
    pub growth_steps: usize,
    /// Constant delay once the growth steps are used up
    pub max_delay: Duration,
    /// Cap applied to every delay
    pub max_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            backoff_multiplier: 2,
            growth_steps: 5,
            max_delay: Duration::from_secs(32),
            max_timeout: None,
        }
    }
}

impl RetryConfig {
    pub fn with_max_timeout(mut self, max_timeout: Option<Duration>) -> Self {
        self.max_timeout = max_timeout;
        self
    }

    /// Delay to wait after the `attempt`th consecutive failure (zero based)
    ///
    /// With the defaults this yields 1, 2, 4, 8, 16, 32, 32, ... seconds.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let delay = if attempt < self.growth_steps {
            let factor = u32::try_from(attempt)
                .ok()
                .and_then(|exp| self.backoff_multiplier.checked_pow(exp))
                .unwrap_or(u32::MAX);
            self.base_delay.saturating_mul(factor)
        } else {
            self.max_delay
        };

        match self.max_timeout {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}

/// Something that can wait between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry with exponential backoff
///
/// Only transient connection errors are retried, and there is no limit on the
/// number of attempts. Any other error is returned without sleeping.
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) if classify_error(&error) == ErrorCategory::Transient => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    attempt = attempt + 1,
                    retry_in_secs = delay.as_secs_f64(),
                    error = %error,
                    "Could not connect to the database, retrying"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
