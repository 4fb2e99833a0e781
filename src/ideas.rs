use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cleaner::{KeywordCleaner, RawKeyword};
use crate::config::Config;
use crate::error::{KeywordError, Result};
use crate::providers::rate_limiter::RateLimiter;
use crate::providers::types::{
    AttributeType, IdeaType, Money, MonthlySearchVolume, NetworkSetting, Paging, RequestType,
    SearchParameter, TargetingIdea, TargetingIdeaSelector,
};
use crate::providers::{open_session, AdsPlatform, KeywordIdeaApi, ServiceKind};

/// Most keywords accepted by a single idea lookup
pub const KEYWORD_LIMIT: usize = 500;

/// Page size requested from the idea service
pub const PAGE_LIMIT: u32 = 500;

/// Search statistics for one keyword
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeywordIdeaResult {
    /// Approximate monthly searches
    pub volume: i64,
    /// Rounded mean of the monthly search breakdown
    pub average: i64,
    /// Average cost per click in currency units
    pub average_cpc: f64,
    pub competition: f64,
}

pub type KeywordIdeas = HashMap<String, KeywordIdeaResult>;

/// Looks up search volume, CPC and competition for seed keywords
#[derive(Debug)]
pub struct KeywordIdeaLookup {
    service: Box<dyn KeywordIdeaApi>,
    cleaner: KeywordCleaner,
    limiter: RateLimiter,
}

impl KeywordIdeaLookup {
    #[must_use]
    pub fn new(
        service: Box<dyn KeywordIdeaApi>,
        cleaner: KeywordCleaner,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            service,
            cleaner,
            limiter,
        }
    }

    /// Bind to the platform's idea service using the session config file
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError::MissingServiceClass`] when the platform has no
    /// idea service and [`KeywordError::ConfigFileNotFound`] when the session
    /// config file is missing.
    pub fn connect(platform: &dyn AdsPlatform, config: &Config) -> Result<Self> {
        let session = open_session(
            platform,
            ServiceKind::TargetingIdea,
            &config.session.config_file,
        )?;
        let service = platform
            .keyword_idea_service(&session)
            .ok_or(KeywordError::MissingServiceClass(ServiceKind::TargetingIdea))?;
        Ok(Self::new(
            service,
            KeywordCleaner::new(config.cleaning.mode),
            RateLimiter::new(config.retry),
        ))
    }

    /// Fetch statistics for `keywords`, optionally restricted to a location
    ///
    /// Keywords the platform has no data for are mapped to an all-zero
    /// result when the whole page comes back empty.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError::TooManyKeywords`] for more than
    /// [`KEYWORD_LIMIT`] keywords, before any remote call. API errors other
    /// than rate limiting are returned unchanged.
    pub fn get<K: RawKeyword>(
        &self,
        keywords: &[K],
        country: Option<i64>,
    ) -> Result<KeywordIdeas> {
        if keywords.len() > KEYWORD_LIMIT {
            return Err(KeywordError::TooManyKeywords {
                count: keywords.len(),
                limit: KEYWORD_LIMIT,
            });
        }

        let selector = build_selector(self.cleaner.clean(keywords), country);
        self.limiter.run(|| self.retrieve_results(&selector))
    }

    fn retrieve_results(&self, selector: &TargetingIdeaSelector) -> Result<KeywordIdeas> {
        debug!(
            keywords = selector.queries().len(),
            locations = ?selector.locations(),
            "Requesting keyword ideas"
        );
        let page = self.service.get(selector)?;

        let Some(entries) = page.entries else {
            info!(
                keywords = selector.queries().len(),
                "No keyword ideas found, returning empty statistics"
            );
            return Ok(selector
                .queries()
                .iter()
                .map(|keyword| (keyword.clone(), KeywordIdeaResult::default()))
                .collect());
        };

        let results: KeywordIdeas = entries
            .iter()
            .map(|idea| (idea.keyword_text.clone(), map_result(idea)))
            .collect();
        info!(results = results.len(), "Received keyword ideas");
        Ok(results)
    }
}

/// Build the stats selector for already cleaned keywords
///
/// A zero `country` means no location restriction, same as `None`.
#[must_use]
pub fn build_selector(keywords: Vec<String>, country: Option<i64>) -> TargetingIdeaSelector {
    let mut search_parameters = vec![
        SearchParameter::RelatedToQuery { queries: keywords },
        SearchParameter::Network {
            network_setting: NetworkSetting::google_search(),
        },
    ];

    if let Some(location) = country.filter(|&id| id != 0) {
        search_parameters.push(SearchParameter::Location {
            locations: vec![location],
        });
    }

    TargetingIdeaSelector {
        search_parameters,
        idea_type: IdeaType::Keyword,
        request_type: RequestType::Stats,
        requested_attribute_types: vec![
            AttributeType::SearchVolume,
            AttributeType::KeywordText,
            AttributeType::AverageCpc,
            AttributeType::Competition,
            AttributeType::TargetedMonthlySearches,
        ],
        paging: Paging {
            start_index: 0,
            number_results: PAGE_LIMIT,
        },
    }
}

fn map_result(idea: &TargetingIdea) -> KeywordIdeaResult {
    KeywordIdeaResult {
        volume: idea.search_volume.unwrap_or(0),
        average: monthly_average(idea.targeted_monthly_searches.as_deref().unwrap_or_default()),
        average_cpc: idea.average_cpc.map_or(0.0, Money::as_units),
        competition: idea.competition.unwrap_or(0.0),
    }
}

/// Mean monthly searches rounded half away from zero; missing counts are zero
/// and the total saturates instead of overflowing
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
#[must_use]
pub fn monthly_average(volumes: &[MonthlySearchVolume]) -> i64 {
    if volumes.is_empty() {
        return 0;
    }
    let total = volumes
        .iter()
        .map(|volume| volume.count.unwrap_or(0))
        .fold(0_i64, i64::saturating_add);
    (total as f64 / volumes.len() as f64).round() as i64
}
