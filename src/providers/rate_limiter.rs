use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::error::{KeywordError, Result};

/// Blocks the calling thread between rate-limited attempts
pub trait Sleeper: std::fmt::Debug + Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// `RateLimiter` retries an operation for as long as the ads platform answers
/// with a rate-exceeded error, sleeping the advertised delay in between
#[derive(Debug)]
pub struct RateLimiter {
    retry: RetryConfig,
    sleeper: Box<dyn Sleeper>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RateLimiter {
    /// Create a `RateLimiter` that sleeps on the current thread
    #[must_use]
    pub fn new(retry: RetryConfig) -> Self {
        Self::with_sleeper(retry, Box::new(ThreadSleeper))
    }

    #[must_use]
    pub fn with_sleeper(retry: RetryConfig, sleeper: Box<dyn Sleeper>) -> Self {
        Self { retry, sleeper }
    }

    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Run `op` until it stops failing with a rate-limit signal
    ///
    /// Each attempt calls `op` again with nothing changed; any error other
    /// than a rate-limit signal is returned as is.
    ///
    /// # Errors
    ///
    /// Returns the first non rate-limit error from `op`, or
    /// [`KeywordError::RateLimitRetriesExhausted`] once `max_retries` is set
    /// and used up.
    pub fn run<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            let err = match op() {
                Ok(value) => {
                    if attempts > 1 {
                        debug!(attempts, "Request succeeded after rate limiting");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            let Some(retry_after) = err.retry_after() else {
                return Err(err);
            };

            if let Some(max_retries) = self.retry.max_retries {
                if attempts > max_retries {
                    warn!(attempts, ?retry_after, "Giving up after repeated rate limiting");
                    return Err(KeywordError::RateLimitRetriesExhausted {
                        attempts,
                        retry_after,
                    });
                }
            }

            warn!(
                attempt = attempts,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded, backing off"
            );
            self.sleeper.sleep(retry_after);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::RecordingSleeper;
    use crate::providers::ApiError;
    use std::cell::Cell;

    fn limiter(max_retries: Option<u32>) -> (RateLimiter, RecordingSleeper) {
        let sleeper = RecordingSleeper::default();
        let limiter = RateLimiter::with_sleeper(
            RetryConfig { max_retries },
            Box::new(sleeper.clone()),
        );
        (limiter, sleeper)
    }

    #[test]
    fn test_returns_first_success() {
        let (limiter, sleeper) = limiter(None);
        let result = limiter.run(|| Ok::<_, KeywordError>(42));
        assert_eq!(result.unwrap(), 42);
        assert!(sleeper.sleeps().is_empty());
    }

    #[test]
    fn test_sleeps_advertised_delay_then_retries() {
        let (limiter, sleeper) = limiter(None);
        let calls = Cell::new(0);
        let result = limiter.run(|| {
            calls.set(calls.get() + 1);
            match calls.get() {
                1 => Err(ApiError::rate_exceeded(3).into()),
                2 => Err(ApiError::rate_exceeded(10).into()),
                _ => Ok("done"),
            }
        });
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
        assert_eq!(
            sleeper.sleeps(),
            vec![Duration::from_secs(3), Duration::from_secs(10)]
        );
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let (limiter, sleeper) = limiter(None);
        let calls = Cell::new(0);
        let result: Result<()> = limiter.run(|| {
            calls.set(calls.get() + 1);
            Err(ApiError::other("AUTHORIZATION_ERROR").into())
        });
        match result {
            Err(KeywordError::Api(err)) => assert_eq!(err, ApiError::other("AUTHORIZATION_ERROR")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls.get(), 1);
        assert!(sleeper.sleeps().is_empty());

        let result: Result<()> = limiter.run(|| Err(KeywordError::NoAdGroupEstimates));
        assert!(matches!(result, Err(KeywordError::NoAdGroupEstimates)));
    }

    #[test]
    fn test_bounded_retries_give_up() {
        let (limiter, sleeper) = limiter(Some(2));
        let calls = Cell::new(0);
        let result: Result<()> = limiter.run(|| {
            calls.set(calls.get() + 1);
            Err(ApiError::rate_exceeded(1).into())
        });
        match result {
            Err(KeywordError::RateLimitRetriesExhausted {
                attempts,
                retry_after,
            }) => {
                assert_eq!(attempts, 3);
                assert_eq!(retry_after, Duration::from_secs(1));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls.get(), 3);
        assert_eq!(sleeper.sleeps().len(), 2);
    }

    #[test]
    fn test_zero_retries_fails_on_first_rate_limit() {
        let (limiter, sleeper) = limiter(Some(0));
        assert_eq!(limiter.retry_config().max_retries, Some(0));
        let result: Result<()> = limiter.run(|| Err(ApiError::rate_exceeded(5).into()));
        assert!(matches!(
            result,
            Err(KeywordError::RateLimitRetriesExhausted { attempts: 1, .. })
        ));
        assert!(sleeper.sleeps().is_empty());
    }
}
