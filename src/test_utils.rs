// This module is only compiled when running tests
#![cfg(any(test, feature = "testing"))]

use crate::ideas::build_selector;
use crate::providers::types::{
    AdGroupEstimate, CampaignEstimate, KeywordEstimate, MonthlySearchVolume, StatsEstimate,
    TargetingIdea, TargetingIdeaSelector, TrafficEstimatorResult,
};

/// A keyword idea with only the search volume filled in
#[must_use]
pub fn idea(keyword: &str, search_volume: Option<i64>) -> TargetingIdea {
    TargetingIdea {
        keyword_text: keyword.to_string(),
        search_volume,
        average_cpc: None,
        competition: None,
        targeted_monthly_searches: None,
    }
}

/// Monthly breakdown starting January 2018, one entry per count
#[must_use]
pub fn monthly(counts: &[Option<i64>]) -> Vec<MonthlySearchVolume> {
    counts
        .iter()
        .zip(1..)
        .map(|(&count, month)| MonthlySearchVolume {
            year: Some(2018),
            month: Some(month),
            count,
        })
        .collect()
}

/// The selector the idea lookup would send for these keywords
#[must_use]
pub fn idea_selector(keywords: &[&str]) -> TargetingIdeaSelector {
    build_selector(keywords.iter().map(ToString::to_string).collect(), None)
}

/// A single campaign / ad group result with one keyword estimate per daily
/// impression ceiling
#[must_use]
pub fn traffic_result(impressions_per_day: &[Option<f64>]) -> TrafficEstimatorResult {
    let keyword_estimates = impressions_per_day
        .iter()
        .map(|&impressions| KeywordEstimate {
            min: StatsEstimate::default(),
            max: StatsEstimate {
                impressions_per_day: impressions,
                ..StatsEstimate::default()
            },
        })
        .collect();

    TrafficEstimatorResult {
        campaign_estimates: vec![CampaignEstimate {
            ad_group_estimates: vec![AdGroupEstimate { keyword_estimates }],
        }],
    }
}
