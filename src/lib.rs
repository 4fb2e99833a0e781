pub mod cleaner;
pub mod client;
pub mod config;
pub mod error;
pub mod ideas;
pub mod logging;
pub mod providers;
pub mod traffic;

// Re-export key types for convenience
pub use cleaner::{CleaningMode, KeywordCleaner, RawKeyword};
pub use client::KeywordInsights;
pub use config::{Config, RetryConfig, TrafficConfig};
pub use error::{KeywordError, Result};
pub use ideas::{KeywordIdeaLookup, KeywordIdeaResult, KeywordIdeas};
pub use logging::init_logging;
pub use providers::rate_limiter::{RateLimiter, Sleeper};
pub use providers::{AdsPlatform, AdsSession, ApiError, ServiceKind};
pub use traffic::{TrafficEstimateLookup, TrafficEstimates};

// Test utilities module - only compiled with test or testing feature
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;
