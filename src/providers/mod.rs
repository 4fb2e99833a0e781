use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{KeywordError, Result};

pub mod mock;
pub mod rate_limiter;
pub mod types;

pub use types::{
    TargetingIdeaPage, TargetingIdeaSelector, TrafficEstimatorResult, TrafficEstimatorSelector,
};

/// The remote services this crate binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    TargetingIdea,
    TrafficEstimator,
}

impl Display for ServiceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetingIdea => write!(f, "TargetingIdeaService"),
            Self::TrafficEstimator => write!(f, "TrafficEstimatorService"),
        }
    }
}

/// One entry of the error list carried by a failed API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiErrorReason {
    /// The account or developer token exceeded a rate; retry after the delay
    RateExceeded {
        retry_after_seconds: u64,
        #[serde(default)]
        rate_name: Option<String>,
        #[serde(default)]
        rate_scope: Option<String>,
    },
    Other {
        reason: String,
        #[serde(default)]
        trigger: Option<String>,
    },
}

impl Display for ApiErrorReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateExceeded {
                retry_after_seconds,
                rate_name,
                ..
            } => {
                write!(f, "RateExceededError")?;
                if let Some(name) = rate_name {
                    write!(f, " [{name}]")?;
                }
                write!(f, " (retry after {retry_after_seconds}s)")
            }
            Self::Other { reason, trigger } => match trigger {
                Some(trigger) => write!(f, "{reason} (trigger: {trigger})"),
                None => write!(f, "{reason}"),
            },
        }
    }
}

/// A failed call to the ads platform
///
/// Mirrors the SDK's exception: a list of errors of which only the first
/// decides whether the failure is a rate-limit signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub errors: Vec<ApiErrorReason>,
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ads API request failed")?;
        for (i, reason) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{reason}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    #[must_use]
    pub const fn new(errors: Vec<ApiErrorReason>) -> Self {
        Self { errors }
    }

    /// Shorthand for a single rate-exceeded error
    #[must_use]
    pub fn rate_exceeded(retry_after_seconds: u64) -> Self {
        Self::new(vec![ApiErrorReason::RateExceeded {
            retry_after_seconds,
            rate_name: None,
            rate_scope: None,
        }])
    }

    /// Shorthand for a single non-retryable error
    #[must_use]
    pub fn other(reason: impl Into<String>) -> Self {
        Self::new(vec![ApiErrorReason::Other {
            reason: reason.into(),
            trigger: None,
        }])
    }

    /// The retry delay, if the first error is a rate-exceeded error
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self.errors.first() {
            Some(ApiErrorReason::RateExceeded {
                retry_after_seconds,
                ..
            }) => Some(Duration::from_secs(*retry_after_seconds)),
            _ => None,
        }
    }
}

/// An authenticated session handle
///
/// The config file (OAuth2 credentials, account identifiers) belongs to the
/// ads SDK; this crate only checks that it exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdsSession {
    config_file: PathBuf,
}

impl AdsSession {
    /// Build a session from the SDK configuration file
    ///
    /// Only existence is checked; any path that exists, a directory included,
    /// is handed to the SDK as is.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError::ConfigFileNotFound`] if nothing exists at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(KeywordError::ConfigFileNotFound(path.to_path_buf()));
        }
        Ok(Self {
            config_file: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }
}

/// Remote keyword idea service
pub trait KeywordIdeaApi: std::fmt::Debug + Send + Sync {
    /// Fetch one page of keyword ideas for the selector
    ///
    /// # Errors
    ///
    /// Returns the platform's [`ApiError`], which may be a rate-limit signal.
    fn get(
        &self,
        selector: &TargetingIdeaSelector,
    ) -> std::result::Result<TargetingIdeaPage, ApiError>;
}

/// Remote traffic estimator service
pub trait TrafficEstimatorApi: std::fmt::Debug + Send + Sync {
    /// Estimate traffic for the campaigns described by the selector
    ///
    /// # Errors
    ///
    /// Returns the platform's [`ApiError`], which may be a rate-limit signal.
    fn get(
        &self,
        selector: &TrafficEstimatorSelector,
    ) -> std::result::Result<TrafficEstimatorResult, ApiError>;
}

/// Binding to the ads-platform SDK
pub trait AdsPlatform: std::fmt::Debug + Send + Sync {
    /// Whether the SDK ships a binding for the given service
    fn supports(&self, service: ServiceKind) -> bool;

    /// Create the keyword idea service for an authenticated session
    fn keyword_idea_service(&self, session: &AdsSession) -> Option<Box<dyn KeywordIdeaApi>>;

    /// Create the traffic estimator service for an authenticated session
    fn traffic_estimator_service(
        &self,
        session: &AdsSession,
    ) -> Option<Box<dyn TrafficEstimatorApi>>;
}

/// Check the service binding and the config file, in that order, and open a session
///
/// # Errors
///
/// Returns [`KeywordError::MissingServiceClass`] if the platform lacks the
/// service, or [`KeywordError::ConfigFileNotFound`] if the file is missing.
pub fn open_session(
    platform: &dyn AdsPlatform,
    service: ServiceKind,
    config_file: &Path,
) -> Result<AdsSession> {
    if !platform.supports(service) {
        return Err(KeywordError::MissingServiceClass(service));
    }
    AdsSession::from_file(config_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockPlatform;
    use tempfile::NamedTempFile;

    #[test]
    fn test_first_error_decides_rate_limit() {
        let err = ApiError::new(vec![
            ApiErrorReason::Other {
                reason: "QUOTA_CHECK_ERROR".to_string(),
                trigger: None,
            },
            ApiErrorReason::RateExceeded {
                retry_after_seconds: 30,
                rate_name: None,
                rate_scope: None,
            },
        ]);
        assert_eq!(err.retry_after(), None);

        let err = ApiError::rate_exceeded(30);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::new(vec![
            ApiErrorReason::RateExceeded {
                retry_after_seconds: 5,
                rate_name: Some("RATE_LIMIT".to_string()),
                rate_scope: Some("ACCOUNT".to_string()),
            },
            ApiErrorReason::Other {
                reason: "INTERNAL_ERROR".to_string(),
                trigger: Some("x".to_string()),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "ads API request failed: RateExceededError [RATE_LIMIT] (retry after 5s); INTERNAL_ERROR (trigger: x)"
        );
    }

    #[test]
    fn test_session_requires_existing_file() {
        let missing = AdsSession::from_file("/definitely/not/here/ads.ini");
        assert!(matches!(missing, Err(KeywordError::ConfigFileNotFound(_))));

        let file = NamedTempFile::new().unwrap();
        let session = AdsSession::from_file(file.path()).unwrap();
        assert_eq!(session.config_file(), file.path());

        let dir = tempfile::tempdir().unwrap();
        let session = AdsSession::from_file(dir.path()).unwrap();
        assert_eq!(session.config_file(), dir.path());
    }

    #[test]
    fn test_open_session_checks_service_first() {
        let platform = MockPlatform::new().without_service(ServiceKind::TargetingIdea);
        let result = open_session(
            &platform,
            ServiceKind::TargetingIdea,
            Path::new("/definitely/not/here/ads.ini"),
        );
        assert!(matches!(
            result,
            Err(KeywordError::MissingServiceClass(ServiceKind::TargetingIdea))
        ));

        let result = open_session(
            &platform,
            ServiceKind::TrafficEstimator,
            Path::new("/definitely/not/here/ads.ini"),
        );
        assert!(matches!(result, Err(KeywordError::ConfigFileNotFound(_))));
    }
}
