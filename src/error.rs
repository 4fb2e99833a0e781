use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::providers::{ApiError, ServiceKind};

/// Failures surfaced by the keyword lookups
#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("ads API config file does not exist: {}", .0.display())]
    ConfigFileNotFound(PathBuf),

    #[error("ads platform does not provide the {0} service")]
    MissingServiceClass(ServiceKind),

    #[error("too many keywords: got {count}, at most {limit} are accepted")]
    TooManyKeywords { count: usize, limit: usize },

    #[error("traffic estimator returned no campaign estimates")]
    NoCampaignEstimates,

    #[error("traffic estimator returned no ad group estimates")]
    NoAdGroupEstimates,

    #[error("traffic estimator returned no keyword estimates")]
    NoKeywordEstimates,

    #[error("traffic estimator returned {actual} keyword estimates for {expected} keywords")]
    KeywordEstimateCountMismatch { expected: usize, actual: usize },

    #[error("still rate limited after {attempts} attempts (last retry-after {retry_after:?})")]
    RateLimitRetriesExhausted { attempts: u32, retry_after: Duration },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl KeywordError {
    /// The server-advertised delay when this error is a rate-limit signal
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Api(err) => err.retry_after(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, KeywordError>;
