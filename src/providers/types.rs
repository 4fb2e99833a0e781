//! Typed request and response records exchanged with the ads platform.

use serde::{Deserialize, Serialize};

/// Integer currency amount where 1,000,000 units make one currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub micro_amount: i64,
}

impl Money {
    pub const MICROS_PER_UNIT: i64 = 1_000_000;

    #[must_use]
    pub const fn from_micros(micro_amount: i64) -> Self {
        Self { micro_amount }
    }

    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self::from_micros(units * Self::MICROS_PER_UNIT)
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_units(self) -> f64 {
        self.micro_amount as f64 / Self::MICROS_PER_UNIT as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSetting {
    pub target_google_search: bool,
    pub target_search_network: bool,
    pub target_content_network: bool,
    pub target_partner_search_network: bool,
}

impl NetworkSetting {
    /// Google Search only
    #[must_use]
    pub const fn google_search() -> Self {
        Self {
            target_google_search: true,
            target_search_network: false,
            target_content_network: false,
            target_partner_search_network: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchParameter {
    RelatedToQuery { queries: Vec<String> },
    Network { network_setting: NetworkSetting },
    Location { locations: Vec<i64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeType {
    SearchVolume,
    KeywordText,
    AverageCpc,
    Competition,
    TargetedMonthlySearches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdeaType {
    Keyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    Stats,
    Ideas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub start_index: u32,
    pub number_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingIdeaSelector {
    pub search_parameters: Vec<SearchParameter>,
    pub idea_type: IdeaType,
    pub request_type: RequestType,
    pub requested_attribute_types: Vec<AttributeType>,
    pub paging: Paging,
}

impl TargetingIdeaSelector {
    /// The keywords submitted through the related-to-query parameter
    #[must_use]
    pub fn queries(&self) -> &[String] {
        self.search_parameters
            .iter()
            .find_map(|param| match param {
                SearchParameter::RelatedToQuery { queries } => Some(queries.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Location ids the selector is restricted to, empty for no restriction
    #[must_use]
    pub fn locations(&self) -> &[i64] {
        self.search_parameters
            .iter()
            .find_map(|param| match param {
                SearchParameter::Location { locations } => Some(locations.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySearchVolume {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub count: Option<i64>,
}

/// One keyword's statistics as returned by the idea service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetingIdea {
    pub keyword_text: String,
    #[serde(default)]
    pub search_volume: Option<i64>,
    #[serde(default)]
    pub average_cpc: Option<Money>,
    #[serde(default)]
    pub competition: Option<f64>,
    #[serde(default)]
    pub targeted_monthly_searches: Option<Vec<MonthlySearchVolume>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetingIdeaPage {
    #[serde(default)]
    pub total_num_entries: u32,
    /// `None` when the platform found nothing for the query
    #[serde(default)]
    pub entries: Option<Vec<TargetingIdea>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Exact,
    #[default]
    Phrase,
    Broad,
}

impl std::str::FromStr for MatchType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "EXACT" => Ok(Self::Exact),
            "PHRASE" => Ok(Self::Phrase),
            "BROAD" => Ok(Self::Broad),
            other => Err(anyhow::anyhow!("unknown match type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEstimateRequest {
    pub keyword: Keyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdGroupEstimateRequest {
    pub keyword_estimate_requests: Vec<KeywordEstimateRequest>,
    pub max_cpc: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Criterion {
    Location { id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignEstimateRequest {
    pub ad_group_estimate_requests: Vec<AdGroupEstimateRequest>,
    pub criteria: Vec<Criterion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficEstimatorSelector {
    pub campaign_estimate_requests: Vec<CampaignEstimateRequest>,
    /// Also ask for per-platform breakdowns
    pub platform_estimate_requested: bool,
}

impl TrafficEstimatorSelector {
    /// Keyword texts across every ad group of every campaign, in request order
    #[must_use]
    pub fn keyword_texts(&self) -> impl Iterator<Item = &str> {
        self.campaign_estimate_requests
            .iter()
            .flat_map(|campaign| &campaign.ad_group_estimate_requests)
            .flat_map(|ad_group| &ad_group.keyword_estimate_requests)
            .map(|request| request.keyword.text.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsEstimate {
    #[serde(default)]
    pub impressions_per_day: Option<f64>,
    #[serde(default)]
    pub clicks_per_day: Option<f64>,
    #[serde(default)]
    pub average_cpc: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeywordEstimate {
    #[serde(default)]
    pub min: StatsEstimate,
    #[serde(default)]
    pub max: StatsEstimate,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdGroupEstimate {
    #[serde(default)]
    pub keyword_estimates: Vec<KeywordEstimate>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CampaignEstimate {
    #[serde(default)]
    pub ad_group_estimates: Vec<AdGroupEstimate>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrafficEstimatorResult {
    #[serde(default)]
    pub campaign_estimates: Vec<CampaignEstimate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_money_conversion() {
        assert_eq!(Money::from_units(100).micro_amount, 100_000_000);
        assert!((Money::from_micros(1_250_000).as_units() - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_match_type_parsing() {
        assert_eq!("phrase".parse::<MatchType>().unwrap(), MatchType::Phrase);
        assert_eq!("EXACT".parse::<MatchType>().unwrap(), MatchType::Exact);
        assert!("fuzzy".parse::<MatchType>().is_err());
        assert_eq!(
            serde_json::to_string(&MatchType::Exact).unwrap(),
            "\"EXACT\""
        );
    }

    #[test]
    fn test_page_deserializes_without_entries() {
        let page: TargetingIdeaPage = serde_json::from_str(r#"{"total_num_entries": 0}"#).unwrap();
        assert_eq!(page.entries, None);

        let page: TargetingIdeaPage = serde_json::from_str(
            r#"{"entries": [{"keyword_text": "loan", "search_volume": 90,
                 "average_cpc": {"micro_amount": 2500000},
                 "targeted_monthly_searches": [{"year": 2018, "month": 1, "count": 80}]}]}"#,
        )
        .unwrap();
        let entries = page.entries.unwrap();
        assert_eq!(entries[0].keyword_text, "loan");
        assert_eq!(entries[0].search_volume, Some(90));
        assert_eq!(entries[0].competition, None);
    }

    #[test]
    fn test_selector_queries_and_locations() {
        let selector = TargetingIdeaSelector {
            search_parameters: vec![
                SearchParameter::Network {
                    network_setting: NetworkSetting::google_search(),
                },
                SearchParameter::RelatedToQuery {
                    queries: vec!["loan".to_string()],
                },
            ],
            idea_type: IdeaType::Keyword,
            request_type: RequestType::Stats,
            requested_attribute_types: vec![AttributeType::KeywordText],
            paging: Paging {
                start_index: 0,
                number_results: 500,
            },
        };
        assert_eq!(selector.queries(), ["loan".to_string()]);
        assert!(selector.locations().is_empty());
    }
}
