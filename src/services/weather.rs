//! Cache-or-fetch weather report resolution.

use crate::{
    config::WeatherConfig,
    models::{ErrorCode, Location, WeatherReport},
    services::{
        clock::Clock,
        metrics::{AppMetrics, CacheOutcome, QuotaOutcome, UpstreamOutcome},
        quota::QuotaGate,
        store::{ReportStore, StoreError},
        upstream::WeatherUpstream,
    },
    utils::mask_credential,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Failure kinds of a report resolution
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid API key")]
    InvalidCredential,

    #[error("Rate limit exceeded for API key")]
    QuotaExceeded,

    #[error("Weather provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ResolveError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ResolveError::InvalidCredential => ErrorCode::InvalidApiKey,
            ResolveError::QuotaExceeded => ErrorCode::RateLimitExceeded,
            ResolveError::UpstreamUnavailable(_) => ErrorCode::ExternalApiError,
            ResolveError::Unexpected(_) => ErrorCode::UnknownError,
        }
    }
}

impl From<StoreError> for ResolveError {
    fn from(err: StoreError) -> Self {
        ResolveError::Unexpected(err.to_string())
    }
}

/// Reasons a provider payload is rejected, in the order they are checked
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("No response from weather API")]
    Missing,

    #[error("Invalid weather data format")]
    ConditionsNotAList,

    #[error("Weather data is empty")]
    ConditionsEmpty,

    #[error("Invalid weather condition format")]
    ConditionNotAnObject,

    #[error("Weather description is missing or invalid")]
    DescriptionMissing,

    #[error("Weather description is empty")]
    DescriptionEmpty,
}

/// Extract the first condition's description from a provider payload
///
/// Expected shape: `{"weather": [{"description": "<text>"}, ...]}`. Checks run in
/// order and stop at the first failure.
pub fn validate_payload(payload: Option<&Value>) -> Result<String, PayloadError> {
    let payload = payload
        .filter(|value| !value.is_null())
        .ok_or(PayloadError::Missing)?;

    let conditions = payload
        .get("weather")
        .and_then(Value::as_array)
        .ok_or(PayloadError::ConditionsNotAList)?;

    let first = conditions.first().ok_or(PayloadError::ConditionsEmpty)?;

    let condition = first.as_object().ok_or(PayloadError::ConditionNotAnObject)?;

    let description = condition
        .get("description")
        .and_then(Value::as_str)
        .ok_or(PayloadError::DescriptionMissing)?;

    if description.is_empty() {
        return Err(PayloadError::DescriptionEmpty);
    }

    Ok(description.to_string())
}

/// Resolves weather reports for callers holding a registered credential
///
/// Concurrent misses for the same location are not coalesced: each one calls the
/// provider and stores its own report.
pub struct ReportResolver {
    gate: Arc<QuotaGate>,
    store: Arc<dyn ReportStore>,
    upstream: Arc<dyn WeatherUpstream>,
    clock: Arc<dyn Clock>,
    freshness_seconds: i64,
    metrics: Option<AppMetrics>,
}

impl ReportResolver {
    pub fn new(
        gate: Arc<QuotaGate>,
        store: Arc<dyn ReportStore>,
        upstream: Arc<dyn WeatherUpstream>,
        clock: Arc<dyn Clock>,
        config: &WeatherConfig,
    ) -> Self {
        Self {
            gate,
            store,
            upstream,
            clock,
            freshness_seconds: config.freshness_seconds,
            metrics: None,
        }
    }

    /// Record quota, cache and upstream outcomes into `metrics`
    pub fn with_metrics(mut self, metrics: AppMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Return a fresh report for `location`, fetching one when needed
    pub async fn resolve(
        &self,
        location: &Location,
        credential: &str,
    ) -> Result<WeatherReport, ResolveError> {
        if !self.gate.is_known(credential) {
            self.record(|m| m.record_quota(QuotaOutcome::Unknown));
            warn!(api_key = %mask_credential(credential), "Rejected unknown API key");
            return Err(ResolveError::InvalidCredential);
        }

        if !self.gate.admit(credential) {
            self.record(|m| m.record_quota(QuotaOutcome::Denied));
            warn!(api_key = %mask_credential(credential), "Quota exceeded");
            return Err(ResolveError::QuotaExceeded);
        }
        self.record(|m| m.record_quota(QuotaOutcome::Admitted));

        match self.store.lookup(location).await? {
            Some(report) if self.is_fresh(&report, self.clock.now()) => {
                self.record(|m| m.record_cache(CacheOutcome::Hit));
                debug!(location = %location, report_id = ?report.id, "Serving cached report");
                return Ok(report);
            }
            Some(report) => {
                self.record(|m| m.record_cache(CacheOutcome::Stale));
                debug!(
                    location = %location,
                    observed_at = report.observed_at,
                    "Cached report is stale"
                );
            }
            None => {
                self.record(|m| m.record_cache(CacheOutcome::Miss));
                debug!(location = %location, "No cached report");
            }
        }

        let report = self.fetch_report(location, credential).await?;
        Ok(self.store.save(report).await?)
    }

    async fn fetch_report(
        &self,
        location: &Location,
        credential: &str,
    ) -> Result<WeatherReport, ResolveError> {
        let payload = self
            .upstream
            .fetch(location, credential)
            .await
            .map_err(|e| {
                self.record(|m| m.record_upstream(UpstreamOutcome::Failure));
                warn!(location = %location, error = %e, "Weather provider request failed");
                ResolveError::UpstreamUnavailable(e.to_string())
            })?;

        let description = validate_payload(payload.as_ref()).map_err(|e| {
            self.record(|m| m.record_upstream(UpstreamOutcome::Invalid));
            warn!(location = %location, reason = %e, "Rejected weather provider payload");
            ResolveError::UpstreamUnavailable(e.to_string())
        })?;
        self.record(|m| m.record_upstream(UpstreamOutcome::Success));

        Ok(WeatherReport::new(
            location.clone(),
            description,
            self.clock.now().timestamp(),
        ))
    }

    fn is_fresh(&self, report: &WeatherReport, now: DateTime<Utc>) -> bool {
        report.age_seconds(now.timestamp()) < self.freshness_seconds
    }

    fn record(&self, f: impl FnOnce(&AppMetrics)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }
}
