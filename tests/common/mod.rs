//! Test doubles for the resolver's collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use weather_quota_api::{
    InMemoryReportStore, Location, ManualClock, QuotaConfig, QuotaGate, RawPayload,
    ReportResolver, ReportStore, ResilientClientError, StoreError, UpstreamError,
    WeatherConfig, WeatherReport, WeatherUpstream,
};

pub const NOW: i64 = 1_700_000_000;
pub const KEY: &str = "API_KEY_1";

/// Upstream double returning a canned payload, or failing when none is set
pub struct FakeUpstream {
    payload: Option<RawPayload>,
    calls: AtomicUsize,
    credentials: Mutex<Vec<String>>,
}

impl FakeUpstream {
    pub fn returning(payload: serde_json::Value) -> Self {
        Self::with(Some(Some(payload)))
    }

    pub fn returning_nothing() -> Self {
        Self::with(Some(None))
    }

    pub fn failing() -> Self {
        Self::with(None)
    }

    fn with(payload: Option<RawPayload>) -> Self {
        Self {
            payload,
            calls: AtomicUsize::new(0),
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn credentials(&self) -> Vec<String> {
        self.credentials.lock().clone()
    }
}

#[async_trait]
impl WeatherUpstream for FakeUpstream {
    async fn fetch(
        &self,
        _location: &Location,
        credential: &str,
    ) -> Result<RawPayload, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.credentials.lock().push(credential.to_string());
        // Let other in-flight resolutions interleave, like real I/O would
        tokio::task::yield_now().await;
        self.payload
            .clone()
            .ok_or(UpstreamError::Transport(ResilientClientError::Timeout))
    }
}

/// In-memory store that counts collaborator calls
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryReportStore,
    lookups: AtomicUsize,
    saves: AtomicUsize,
}

impl CountingStore {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Seed a report without counting it as a save
    pub async fn seed(&self, report: WeatherReport) -> WeatherReport {
        self.inner.save(report).await.unwrap()
    }
}

#[async_trait]
impl ReportStore for CountingStore {
    async fn lookup(&self, location: &Location) -> Result<Option<WeatherReport>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(location).await
    }

    async fn save(&self, report: WeatherReport) -> Result<WeatherReport, StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(report).await
    }
}

/// Store whose every call fails
pub struct FailingStore;

#[async_trait]
impl ReportStore for FailingStore {
    async fn lookup(&self, _location: &Location) -> Result<Option<WeatherReport>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn save(&self, _report: WeatherReport) -> Result<WeatherReport, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Resolver wired to fakes, with handles to inspect them
pub struct Harness {
    pub clock: ManualClock,
    pub gate: Arc<QuotaGate>,
    pub store: Arc<CountingStore>,
    pub upstream: Arc<FakeUpstream>,
}

impl Harness {
    pub fn new(upstream: FakeUpstream) -> Self {
        let clock = ManualClock::at_epoch_seconds(NOW);
        let gate = Arc::new(QuotaGate::new(&QuotaConfig::default(), Arc::new(clock.clone())));
        Self {
            clock,
            gate,
            store: Arc::new(CountingStore::default()),
            upstream: Arc::new(upstream),
        }
    }

    pub fn resolver(&self) -> ReportResolver {
        ReportResolver::new(
            self.gate.clone(),
            self.store.clone(),
            self.upstream.clone(),
            Arc::new(self.clock.clone()),
            &WeatherConfig::default(),
        )
    }
}

pub fn london() -> Location {
    Location::new("London", "UK")
}
