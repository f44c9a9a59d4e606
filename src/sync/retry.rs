//! Bounded exponential backoff for store writes.

use crate::store::{StoreError, StoreResult};
use log::*;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    pub max_delay: Duration,
    /// Add up to 25% random jitter to each delay
    pub use_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(250),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(4),
            use_jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Run `operation` until it succeeds, fails with a non-retriable error or
    /// runs out of retries. `on_retry` is told the attempt number and the
    /// delay before each retry.
    ///
    pub async fn retry<F, Fut, T, R>(
        &self,
        operation_name: &str,
        mut operation: F,
        mut on_retry: R,
    ) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
        R: FnMut(u32, Duration),
    {
        let mut attempt = 0;
        let mut delay = self.initial_delay;
        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!("'{}' succeeded after {} retries", operation_name, attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    attempt += 1;
                    if !error.is_retriable() {
                        warn!("'{}' failed with non-retriable error: {}", operation_name, error);
                        return Err(error);
                    }
                    if attempt > self.max_retries {
                        warn!(
                            "'{}' failed after {} attempts: {}",
                            operation_name, attempt, error
                        );
                        return Err(error);
                    }
                    let actual_delay = self.with_jitter(delay);
                    warn!(
                        "'{}' attempt {} failed: {}. Retrying in {:?}...",
                        operation_name, attempt, error, actual_delay
                    );
                    on_retry(attempt, actual_delay);
                    sleep(actual_delay).await;
                    delay = self.next_delay(delay);
                }
            }
        }
    }

    fn with_jitter(&self, delay: Duration) -> Duration {
        let mut delay = delay;
        if self.use_jitter {
            let jitter = rand::thread_rng().gen_range(0.0..0.25);
            delay += Duration::from_millis((delay.as_millis() as f64 * jitter) as u64);
        }
        delay.min(self.max_delay)
    }

    fn next_delay(&self, current: Duration) -> Duration {
        let next = (current.as_millis() as f64 * self.backoff_multiplier) as u64;
        Duration::from_millis(next).min(self.max_delay)
    }
}

/// Whether a write failure means the document is gone rather than the write
/// being lost.
///
pub fn is_gone(error: &StoreError) -> bool {
    matches!(error, StoreError::NotFound { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unavailable() -> StoreError {
        StoreError::Api {
            status: 503,
            message: "unavailable".to_string(),
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            use_jitter: false,
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn delays_grow_and_cap() {
        let policy = policy();
        let mut delay = policy.initial_delay;
        let mut seen = vec![];
        for _ in 0..6 {
            seen.push(delay.as_millis());
            delay = policy.next_delay(delay);
        }
        assert_eq!(seen, vec![250, 500, 1000, 2000, 4000, 4000]);
    }

    #[test]
    fn jitter_stays_within_a_quarter() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let delay = policy.with_jitter(Duration::from_millis(400));
            assert!(delay >= Duration::from_millis(400));
            assert!(delay <= Duration::from_millis(500));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let mut retries = vec![];
        let result = policy()
            .retry(
                "write",
                || async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(unavailable())
                    } else {
                        Ok("done")
                    }
                },
                |attempt, delay| retries.push((attempt, delay)),
            )
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            retries,
            vec![
                (1, Duration::from_millis(250)),
                (2, Duration::from_millis(500))
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: StoreResult<()> = policy()
            .retry(
                "write",
                || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(unavailable())
                },
                |_, _| {},
            )
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retriable_errors_fail_fast() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: StoreResult<()> = policy()
            .retry(
                "write",
                || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(StoreError::NotFound {
                        path: "storages/team/items/b1".to_string(),
                    })
                },
                |_, _| {},
            )
            .await;
        assert!(is_gone(&result.unwrap_err()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
