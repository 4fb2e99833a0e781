use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::providers::rate_limiter::Sleeper;
use crate::providers::{
    AdsPlatform, AdsSession, ApiError, KeywordIdeaApi, ServiceKind, TargetingIdeaPage,
    TargetingIdeaSelector, TrafficEstimatorApi, TrafficEstimatorResult, TrafficEstimatorSelector,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type Scripted<T> = std::result::Result<T, ApiError>;

/// In-memory keyword idea service answering from a script
///
/// Scripted responses are consumed in order; once the script runs out every
/// call gets the default page. Every selector received is recorded.
#[derive(Debug, Clone, Default)]
pub struct MockIdeaService {
    calls: Arc<Mutex<Vec<TargetingIdeaSelector>>>,
    script: Arc<Mutex<VecDeque<Scripted<TargetingIdeaPage>>>>,
    default_page: Arc<Mutex<TargetingIdeaPage>>,
}

impl MockIdeaService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next unanswered call
    pub fn push_response(&self, response: Scripted<TargetingIdeaPage>) {
        lock(&self.script).push_back(response);
    }

    pub fn set_default(&self, page: TargetingIdeaPage) {
        *lock(&self.default_page) = page;
    }

    /// Selectors received so far, in call order
    #[must_use]
    pub fn calls(&self) -> Vec<TargetingIdeaSelector> {
        lock(&self.calls).clone()
    }
}

impl KeywordIdeaApi for MockIdeaService {
    fn get(&self, selector: &TargetingIdeaSelector) -> Scripted<TargetingIdeaPage> {
        lock(&self.calls).push(selector.clone());
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| Ok(lock(&self.default_page).clone()))
    }
}

/// In-memory traffic estimator answering from a script
#[derive(Debug, Clone, Default)]
pub struct MockTrafficService {
    calls: Arc<Mutex<Vec<TrafficEstimatorSelector>>>,
    script: Arc<Mutex<VecDeque<Scripted<TrafficEstimatorResult>>>>,
    default_result: Arc<Mutex<TrafficEstimatorResult>>,
}

impl MockTrafficService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: Scripted<TrafficEstimatorResult>) {
        lock(&self.script).push_back(response);
    }

    pub fn set_default(&self, result: TrafficEstimatorResult) {
        *lock(&self.default_result) = result;
    }

    #[must_use]
    pub fn calls(&self) -> Vec<TrafficEstimatorSelector> {
        lock(&self.calls).clone()
    }
}

impl TrafficEstimatorApi for MockTrafficService {
    fn get(&self, selector: &TrafficEstimatorSelector) -> Scripted<TrafficEstimatorResult> {
        lock(&self.calls).push(selector.clone());
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| Ok(lock(&self.default_result).clone()))
    }
}

/// Scripted responses for a [`MockPlatform`], loadable from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockFixture {
    #[serde(default)]
    pub ideas: Vec<Scripted<TargetingIdeaPage>>,
    #[serde(default)]
    pub traffic: Vec<Scripted<TrafficEstimatorResult>>,
}

/// Ads platform backed by in-memory services
///
/// Services handed out share state with the platform, so calls made through a
/// lookup stay visible here.
#[derive(Debug, Clone)]
pub struct MockPlatform {
    ideas: MockIdeaService,
    traffic: MockTrafficService,
    missing: HashSet<ServiceKind>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ideas: MockIdeaService::new(),
            traffic: MockTrafficService::new(),
            missing: HashSet::new(),
        }
    }

    /// Build a platform from a JSON [`MockFixture`]
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a fixture.
    pub fn from_json(json: &str) -> Result<Self> {
        let fixture: MockFixture = serde_json::from_str(json)?;
        let platform = Self::new();
        for response in fixture.ideas {
            platform.ideas.push_response(response);
        }
        for response in fixture.traffic {
            platform.traffic.push_response(response);
        }
        Ok(platform)
    }

    /// Pretend the SDK ships no binding for `service`
    #[must_use]
    pub fn without_service(mut self, service: ServiceKind) -> Self {
        self.missing.insert(service);
        self
    }

    #[must_use]
    pub const fn ideas(&self) -> &MockIdeaService {
        &self.ideas
    }

    #[must_use]
    pub const fn traffic(&self) -> &MockTrafficService {
        &self.traffic
    }
}

impl AdsPlatform for MockPlatform {
    fn supports(&self, service: ServiceKind) -> bool {
        !self.missing.contains(&service)
    }

    fn keyword_idea_service(&self, _session: &AdsSession) -> Option<Box<dyn KeywordIdeaApi>> {
        self.supports(ServiceKind::TargetingIdea)
            .then(|| Box::new(self.ideas.clone()) as Box<dyn KeywordIdeaApi>)
    }

    fn traffic_estimator_service(
        &self,
        _session: &AdsSession,
    ) -> Option<Box<dyn TrafficEstimatorApi>> {
        self.supports(ServiceKind::TrafficEstimator)
            .then(|| Box::new(self.traffic.clone()) as Box<dyn TrafficEstimatorApi>)
    }
}

/// Sleeper that records requested delays instead of blocking
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        lock(&self.sleeps).push(duration);
    }
}
