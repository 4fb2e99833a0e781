use crate::cleaner::RawKeyword;
use crate::config::Config;
use crate::error::Result;
use crate::ideas::{KeywordIdeaLookup, KeywordIdeas};
use crate::providers::AdsPlatform;
use crate::traffic::{TrafficEstimateLookup, TrafficEstimates};

/// Both keyword lookups bound to one ads platform
#[derive(Debug)]
pub struct KeywordInsights {
    ideas: KeywordIdeaLookup,
    traffic: TrafficEstimateLookup,
}

impl KeywordInsights {
    #[must_use]
    pub const fn new(ideas: KeywordIdeaLookup, traffic: TrafficEstimateLookup) -> Self {
        Self { ideas, traffic }
    }

    /// Bind both services of `platform` with the given configuration
    ///
    /// # Errors
    ///
    /// Fails if either service is unavailable or the session config file is
    /// missing.
    pub fn connect(platform: &dyn AdsPlatform, config: &Config) -> Result<Self> {
        Ok(Self::new(
            KeywordIdeaLookup::connect(platform, config)?,
            TrafficEstimateLookup::connect(platform, config)?,
        ))
    }

    /// Search volume, average monthly searches, CPC and competition per keyword
    ///
    /// # Errors
    ///
    /// See [`KeywordIdeaLookup::get`].
    pub fn get_keyword_ideas<K: RawKeyword>(
        &self,
        keywords: &[K],
        country: Option<i64>,
    ) -> Result<KeywordIdeas> {
        self.ideas.get(keywords, country)
    }

    /// Projected monthly impressions per keyword
    ///
    /// # Errors
    ///
    /// See [`TrafficEstimateLookup::get`].
    pub fn get_traffic_estimates<K: RawKeyword>(
        &self,
        keywords: &[K],
        country: Option<i64>,
    ) -> Result<TrafficEstimates> {
        self.traffic.get(keywords, country)
    }
}
