//! Report storage collaborator and its in-memory implementation.

use crate::models::{Location, WeatherReport};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

/// Errors raised by report stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Report store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for weather reports
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Most recently observed report for `location`, if any
    async fn lookup(&self, location: &Location) -> Result<Option<WeatherReport>, StoreError>;

    /// Persist `report` and return the stored value
    async fn save(&self, report: WeatherReport) -> Result<WeatherReport, StoreError>;
}

/// Process-local report store
///
/// Every saved report is kept; lookups return the one with the greatest
/// `observed_at`, preferring the later save on ties.
#[derive(Debug)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<Location, Vec<WeatherReport>>>,
    next_id: AtomicU64,
}

impl Default for InMemoryReportStore {
    fn default() -> Self {
        Self {
            reports: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reports stored for `location`
    pub fn count_for(&self, location: &Location) -> usize {
        self.reports.read().get(location).map_or(0, Vec::len)
    }

    /// Total number of stored reports
    pub fn len(&self) -> usize {
        self.reports.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn lookup(&self, location: &Location) -> Result<Option<WeatherReport>, StoreError> {
        let reports = self.reports.read();
        Ok(reports
            .get(location)
            .and_then(|history| history.iter().max_by_key(|r| r.observed_at))
            .cloned())
    }

    async fn save(&self, report: WeatherReport) -> Result<WeatherReport, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let stored = report.with_id(id);

        self.reports
            .write()
            .entry(stored.location.clone())
            .or_default()
            .push(stored.clone());

        tracing::debug!(
            report_id = id,
            location = %stored.location,
            observed_at = stored.observed_at,
            "Stored weather report"
        );

        Ok(stored)
    }
}
