use std::collections::HashMap;

use tracing::{debug, info};

use crate::cleaner::{KeywordCleaner, RawKeyword};
use crate::config::{Config, TrafficConfig};
use crate::error::{KeywordError, Result};
use crate::providers::rate_limiter::RateLimiter;
use crate::providers::types::{
    AdGroupEstimateRequest, CampaignEstimateRequest, Criterion, Keyword, KeywordEstimate,
    KeywordEstimateRequest, Money, TrafficEstimatorResult, TrafficEstimatorSelector,
};
use crate::providers::{open_session, AdsPlatform, ServiceKind, TrafficEstimatorApi};

/// Days in the projected month
pub const DAYS_PER_MONTH: f64 = 30.0;

pub type TrafficEstimates = HashMap<String, i64>;

/// Projects monthly impressions for keywords from daily traffic estimates
#[derive(Debug)]
pub struct TrafficEstimateLookup {
    service: Box<dyn TrafficEstimatorApi>,
    cleaner: KeywordCleaner,
    limiter: RateLimiter,
    settings: TrafficConfig,
}

impl TrafficEstimateLookup {
    #[must_use]
    pub fn new(
        service: Box<dyn TrafficEstimatorApi>,
        cleaner: KeywordCleaner,
        limiter: RateLimiter,
        settings: TrafficConfig,
    ) -> Self {
        Self {
            service,
            cleaner,
            limiter,
            settings,
        }
    }

    /// Bind to the platform's traffic estimator using the session config file
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError::MissingServiceClass`] when the platform has no
    /// traffic estimator and [`KeywordError::ConfigFileNotFound`] when the
    /// session config file is missing.
    pub fn connect(platform: &dyn AdsPlatform, config: &Config) -> Result<Self> {
        let session = open_session(
            platform,
            ServiceKind::TrafficEstimator,
            &config.session.config_file,
        )?;
        let service = platform
            .traffic_estimator_service(&session)
            .ok_or(KeywordError::MissingServiceClass(
                ServiceKind::TrafficEstimator,
            ))?;
        Ok(Self::new(
            service,
            KeywordCleaner::new(config.cleaning.mode),
            RateLimiter::new(config.retry),
            config.traffic,
        ))
    }

    /// Estimate 30-day impressions for each cleaned keyword
    ///
    /// Unlike the idea lookup this does not cap the number of keywords.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError::NoCampaignEstimates`],
    /// [`KeywordError::NoAdGroupEstimates`] or
    /// [`KeywordError::NoKeywordEstimates`] when a level of the response is
    /// empty, and [`KeywordError::KeywordEstimateCountMismatch`] when the
    /// estimates do not line up with the keywords.
    pub fn get<K: RawKeyword>(
        &self,
        keywords: &[K],
        country: Option<i64>,
    ) -> Result<TrafficEstimates> {
        self.limiter.run(|| self.estimate(keywords, country))
    }

    fn estimate<K: RawKeyword>(
        &self,
        keywords: &[K],
        country: Option<i64>,
    ) -> Result<TrafficEstimates> {
        let keywords = self.cleaner.clean(keywords);
        let selector = self.build_selector(&keywords, country);

        debug!(
            keywords = keywords.len(),
            match_type = ?self.settings.match_type,
            "Requesting traffic estimates"
        );
        let result = self.service.get(&selector)?;
        let estimates = keyword_estimates(&result)?;

        if estimates.len() != keywords.len() {
            return Err(KeywordError::KeywordEstimateCountMismatch {
                expected: keywords.len(),
                actual: estimates.len(),
            });
        }

        // The platform answers in request order
        let projected: TrafficEstimates = keywords
            .into_iter()
            .zip(estimates)
            .map(|(keyword, estimate)| (keyword, monthly_impressions(estimate)))
            .collect();
        info!(results = projected.len(), "Received traffic estimates");
        Ok(projected)
    }

    /// Build the estimator selector for already cleaned keywords
    #[must_use]
    pub fn build_selector(
        &self,
        keywords: &[String],
        country: Option<i64>,
    ) -> TrafficEstimatorSelector {
        let keyword_estimate_requests = keywords
            .iter()
            .map(|text| KeywordEstimateRequest {
                keyword: Keyword {
                    text: text.clone(),
                    match_type: self.settings.match_type,
                },
            })
            .collect();

        let criteria = country
            .map(|id| vec![Criterion::Location { id }])
            .unwrap_or_default();

        TrafficEstimatorSelector {
            campaign_estimate_requests: vec![CampaignEstimateRequest {
                ad_group_estimate_requests: vec![AdGroupEstimateRequest {
                    keyword_estimate_requests,
                    max_cpc: Money::from_micros(self.settings.max_cpc_micros),
                }],
                criteria,
            }],
            platform_estimate_requested: false,
        }
    }
}

/// Descend to the keyword estimates of the first campaign's first ad group
///
/// # Errors
///
/// Returns the error naming the first level that is empty.
pub fn keyword_estimates(result: &TrafficEstimatorResult) -> Result<&[KeywordEstimate]> {
    let campaign = result
        .campaign_estimates
        .first()
        .ok_or(KeywordError::NoCampaignEstimates)?;
    let ad_group = campaign
        .ad_group_estimates
        .first()
        .ok_or(KeywordError::NoAdGroupEstimates)?;
    if ad_group.keyword_estimates.is_empty() {
        return Err(KeywordError::NoKeywordEstimates);
    }
    Ok(&ad_group.keyword_estimates)
}

/// Daily impression ceiling projected over a month, truncated
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn monthly_impressions(estimate: &KeywordEstimate) -> i64 {
    (estimate.max.impressions_per_day.unwrap_or(0.0) * DAYS_PER_MONTH) as i64
}
