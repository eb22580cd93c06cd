#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use linkgate::config::Config;
use linkgate::domain::analytics::{AnalyticsError, AnalyticsEvent, AnalyticsSink};
use linkgate::domain::analytics_worker::AnalyticsDispatcher;
use linkgate::domain::entities::{NewShortLink, ShortLink};
use linkgate::domain::repositories::LinkRepository;
use linkgate::error::AppError;
use linkgate::infrastructure::rate_limit::{
    NullRateLimitStore, RateLimitDecision, RateLimitError, RateLimitResult, RateLimitStore,
};
use linkgate::routes::router;
use linkgate::state::AppState;

/// Link store backed by a map, with atomic counter updates under one lock.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<HashMap<String, ShortLink>>,
    healthy_flag: Mutex<Option<bool>>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unhealthy() -> Self {
        let repo = Self::default();
        *repo.healthy_flag.lock().unwrap() = Some(false);
        repo
    }

    pub fn insert(&self, short_id: &str, original_url: &str, clicks: i64, accesses: i64) {
        self.links.lock().unwrap().insert(
            short_id.to_string(),
            ShortLink::new(
                short_id.to_string(),
                original_url.to_string(),
                Utc::now(),
                clicks,
                accesses,
            ),
        );
    }

    pub fn get(&self, short_id: &str) -> Option<ShortLink> {
        self.links.lock().unwrap().get(short_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut links = self.links.lock().unwrap();
        if links.contains_key(&new_link.short_id) {
            return Err(AppError::conflict("Unique constraint violation"));
        }

        let link = ShortLink::new(
            new_link.short_id.clone(),
            new_link.original_url,
            Utc::now(),
            0,
            0,
        );
        links.insert(new_link.short_id, link.clone());
        Ok(link)
    }

    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self.get(short_id))
    }

    async fn increment_accesses(&self, short_id: &str) -> Result<Option<ShortLink>, AppError> {
        let mut links = self.links.lock().unwrap();
        Ok(links.get_mut(short_id).map(|link| {
            link.accesses += 1;
            link.clone()
        }))
    }

    async fn increment_clicks(&self, short_id: &str) -> Result<Option<ShortLink>, AppError> {
        let mut links = self.links.lock().unwrap();
        Ok(links.get_mut(short_id).map(|link| {
            link.clicks += 1;
            link.clone()
        }))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        match *self.healthy_flag.lock().unwrap() {
            Some(false) => Err(AppError::internal("database is down")),
            _ => Ok(()),
        }
    }
}

/// Analytics sink that keeps every event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalyticsSink for RecordingSink {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Analytics sink that always fails.
pub struct FailingSink;

#[async_trait]
impl AnalyticsSink for FailingSink {
    async fn record(&self, _event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        Err(AnalyticsError::Storage("sink unavailable".to_string()))
    }
}

/// Rate limit store replaying scripted decisions and recording keys.
///
/// Once the script runs out, the last decision repeats.
pub struct ScriptedRateLimitStore {
    script: Mutex<VecDeque<RateLimitResult<RateLimitDecision>>>,
    last: Mutex<Option<RateLimitDecision>>,
    keys: Mutex<Vec<String>>,
}

impl ScriptedRateLimitStore {
    pub fn new(decisions: Vec<RateLimitDecision>) -> Self {
        Self {
            script: Mutex::new(decisions.into_iter().map(Ok).collect()),
            last: Mutex::new(None),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::from([Err(RateLimitError::OperationError(
                "connection reset".to_string(),
            ))])),
            last: Mutex::new(None),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateLimitStore for ScriptedRateLimitStore {
    async fn consume(&self, key: &str) -> RateLimitResult<RateLimitDecision> {
        self.keys.lock().unwrap().push(key.to_string());

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(decision)) => {
                *self.last.lock().unwrap() = Some(decision);
                Ok(decision)
            }
            Some(Err(e)) => Err(e),
            None => self
                .last
                .lock()
                .unwrap()
                .ok_or_else(|| RateLimitError::OperationError("script exhausted".to_string())),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }
}

pub fn decision(allowed: bool, remaining: u32) -> RateLimitDecision {
    RateLimitDecision {
        allowed,
        limit: 20,
        remaining,
        reset: 1_700_000_010_000,
    }
}

pub fn test_config() -> Config {
    Config {
        brand_name: "Sho.rt".to_string(),
        brand_url: "https://sho.rt".to_string(),
        brand_host: "sho.rt".to_string(),
        ..Config::default()
    }
}

/// Everything an integration test needs to poke at.
pub struct TestApp {
    pub server: TestServer,
    pub links: Arc<InMemoryLinkRepository>,
    pub state: AppState,
}

pub struct TestAppBuilder {
    config: Config,
    links: Arc<InMemoryLinkRepository>,
    rate_limiter: Option<Arc<dyn RateLimitStore>>,
    analytics: AnalyticsDispatcher,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            config: test_config(),
            links: Arc::new(InMemoryLinkRepository::new()),
            rate_limiter: None,
            analytics: AnalyticsDispatcher::disabled(),
        }
    }

    pub fn config(mut self, f: impl FnOnce(&mut Config)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn links(mut self, links: Arc<InMemoryLinkRepository>) -> Self {
        self.links = links;
        self
    }

    pub fn rate_limiter(mut self, store: Arc<dyn RateLimitStore>) -> Self {
        self.rate_limiter = Some(store);
        self
    }

    /// Enables analytics and returns the queue receiver.
    pub fn with_analytics(mut self) -> (Self, mpsc::Receiver<AnalyticsEvent>) {
        let (dispatcher, rx) = AnalyticsDispatcher::channel(64);
        self.analytics = dispatcher;
        (self, rx)
    }

    pub fn build(self) -> TestApp {
        let rate_limiter = self.rate_limiter.unwrap_or_else(|| {
            Arc::new(NullRateLimitStore::new(
                self.config.rate_limit_requests,
                self.config.rate_limit_window_ms,
            ))
        });

        let state = AppState::new(
            Arc::new(self.config),
            self.links.clone(),
            rate_limiter,
            self.analytics,
        );

        let app: Router = router(state.clone());
        let server = TestServer::new(app).unwrap();

        TestApp {
            server,
            links: self.links,
            state,
        }
    }
}

pub fn spawn_app() -> TestApp {
    TestAppBuilder::new().build()
}

/// Drains whatever is currently queued on an analytics receiver.
pub fn drain(rx: &mut mpsc::Receiver<AnalyticsEvent>) -> Vec<AnalyticsEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
