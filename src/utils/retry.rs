use anyhow::{Error, Result};
use std::{future::Future, time::Duration};
use tokio::time::sleep;
use tracing::{error, warn};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub exponential: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
            exponential: 2.0,
        }
    }
}

/// Capped exponential backoff with full jitter.
/// https://aws.amazon.com/blogs/architecture/exponential-backoff-and-jitter/
#[derive(Debug, Clone)]
pub struct Backoff {
    config: RetryConfig,
    delay_ms: u64,
}

impl Backoff {
    pub fn new(config: RetryConfig) -> Self {
        let delay_ms = config.base_delay_ms;
        Self { config, delay_ms }
    }

    /// Current delay to sleep for; advances the jittered curve.
    pub fn next_delay(&mut self) -> Duration {
        let current = self.delay_ms;
        let next = current as f64 * self.config.exponential;
        self.delay_ms = std::cmp::min(self.config.max_delay_ms, (fastrand::f64() * next) as u64);
        Duration::from_millis(current)
    }

    pub fn reset(&mut self) {
        self.delay_ms = self.config.base_delay_ms;
    }
}

pub async fn retry<F, Fut, T>(operation: F, config: &RetryConfig, context: &str) -> Result<T, Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, Error>>,
{
    let mut attempt = 1;
    let mut backoff = Backoff::new(config.clone());

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= config.max_attempts {
                    error!(
                        "Operation '{}' failed after {} attempts. Final error: {}",
                        context, attempt, e
                    );
                    return Err(e.context(format!("Failed after {} attempts", attempt)));
                }

                let delay = backoff.next_delay();
                warn!(
                    "Attempt {}/{} for '{}' failed: {}. Retrying in {}ms...",
                    attempt,
                    config.max_attempts,
                    context,
                    e,
                    delay.as_millis()
                );

                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
            exponential: 2.0,
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(anyhow!("transient"))
                } else {
                    Ok(42u32)
                }
            },
            &fast_config(),
            "test_op",
        )
        .await
        .unwrap();
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fails_after_exhausting_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = retry(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow!("permanent"))
            },
            &fast_config(),
            "test_op",
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn backoff_stays_bounded() {
        let mut backoff = Backoff::new(RetryConfig {
            max_attempts: 100,
            base_delay_ms: 100,
            max_delay_ms: 1_000,
            exponential: 10.0,
        });
        for _ in 0..50 {
            assert!(backoff.next_delay() <= Duration::from_millis(1_000));
        }
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }
}
