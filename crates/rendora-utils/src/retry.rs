//! Fixed-interval retry policy

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retries an operation up to `max_attempts` times with a constant delay
/// between attempts. spec.md §4.3 step 1 names one concrete shape for this
/// (5 attempts, 2 second interval) rather than a general exponential-backoff
/// configuration, so that's the only shape this carries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    backoff: Duration,
}

impl RetryPolicy {
    /// Bring-up poller policy: up to `max_attempts` tries, `backoff` between
    /// each.
    pub fn fixed(max_attempts: usize, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Executes an async operation with retry logic
    ///
    /// # Errors
    ///
    /// Returns the last error if all retry attempts fail
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Err(err) => {
                    attempt += 1;

                    if attempt >= self.max_attempts {
                        warn!(
                            "Operation failed after {} attempts: {}",
                            self.max_attempts, err
                        );
                        return Err(err);
                    }

                    warn!(
                        "Operation failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempt, self.max_attempts, err, self.backoff
                    );

                    sleep(self.backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn fixed_sets_attempts_and_interval() {
        let policy = RetryPolicy::fixed(5, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn execute_success_first_attempt() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(10));
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let result = policy
            .execute(|| async {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(42)
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn execute_success_after_retries() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(10));
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let result = policy
            .execute(|| async {
                let count = counter_clone.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err("temporary error".to_string())
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn execute_all_attempts_fail() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(10));
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let result = policy
            .execute(|| async {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>("persistent error".to_string())
            })
            .await;

        assert_eq!(result, Err("persistent error".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
