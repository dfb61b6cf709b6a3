//! Metrics collection and Prometheus integration service.

use prometheus::{CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::time::{Duration, Instant};

/// Outcome of a quota check, used as a metric label
#[derive(Debug, Clone, Copy)]
pub enum QuotaOutcome {
    Admitted,
    Denied,
    Unknown,
}

impl QuotaOutcome {
    fn as_label(self) -> &'static str {
        match self {
            QuotaOutcome::Admitted => "admitted",
            QuotaOutcome::Denied => "denied",
            QuotaOutcome::Unknown => "unknown",
        }
    }
}

/// Result of a report cache lookup, used as a metric label
#[derive(Debug, Clone, Copy)]
pub enum CacheOutcome {
    Hit,
    Miss,
    Stale,
}

impl CacheOutcome {
    fn as_label(self) -> &'static str {
        match self {
            CacheOutcome::Hit => "hit",
            CacheOutcome::Miss => "miss",
            CacheOutcome::Stale => "stale",
        }
    }
}

/// Outcome of an upstream fetch, used as a metric label
#[derive(Debug, Clone, Copy)]
pub enum UpstreamOutcome {
    Success,
    Failure,
    Invalid,
}

impl UpstreamOutcome {
    fn as_label(self) -> &'static str {
        match self {
            UpstreamOutcome::Success => "success",
            UpstreamOutcome::Failure => "failure",
            UpstreamOutcome::Invalid => "invalid",
        }
    }
}

/// Application metrics collector for Prometheus integration
#[derive(Clone)]
pub struct AppMetrics {
    pub registry: Registry,
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub app_uptime_seconds: Gauge,
    pub app_info: CounterVec,
    pub quota_decisions_total: CounterVec,
    pub cache_lookups_total: CounterVec,
    pub upstream_requests_total: CounterVec,
    pub start_time: Instant,
}

impl AppMetrics {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "status", "route"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "route"],
        )?;

        let app_uptime_seconds = Gauge::new("app_uptime_seconds", "Application uptime in seconds")?;

        let app_info = CounterVec::new(
            Opts::new("app_info", "Application information"),
            &["version", "commit", "build_time"],
        )?;

        let quota_decisions_total = CounterVec::new(
            Opts::new("quota_decisions_total", "Quota decisions by outcome"),
            &["outcome"],
        )?;

        let cache_lookups_total = CounterVec::new(
            Opts::new("weather_cache_lookups_total", "Weather report cache lookups by result"),
            &["result"],
        )?;

        let upstream_requests_total = CounterVec::new(
            Opts::new(
                "weather_upstream_requests_total",
                "Weather provider requests by outcome",
            ),
            &["outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(app_uptime_seconds.clone()))?;
        registry.register(Box::new(app_info.clone()))?;
        registry.register(Box::new(quota_decisions_total.clone()))?;
        registry.register(Box::new(cache_lookups_total.clone()))?;
        registry.register(Box::new(upstream_requests_total.clone()))?;

        app_info
            .with_label_values(&[
                env!("CARGO_PKG_VERSION"),
                option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
                option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
            ])
            .inc();

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            app_uptime_seconds,
            app_info,
            quota_decisions_total,
            cache_lookups_total,
            upstream_requests_total,
            start_time: Instant::now(),
        })
    }

    /// Record an HTTP request with method, route, status, and duration
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration: Duration) {
        if route == "/api/metrics" {
            // Scrapes are not traffic
            return;
        }

        self.http_requests_total
            .with_label_values(&[method, &status.to_string(), route])
            .inc();

        self.http_request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration.as_secs_f64());
    }

    pub fn record_quota(&self, outcome: QuotaOutcome) {
        self.quota_decisions_total
            .with_label_values(&[outcome.as_label()])
            .inc();
    }

    pub fn record_cache(&self, outcome: CacheOutcome) {
        self.cache_lookups_total
            .with_label_values(&[outcome.as_label()])
            .inc();
    }

    pub fn record_upstream(&self, outcome: UpstreamOutcome) {
        self.upstream_requests_total
            .with_label_values(&[outcome.as_label()])
            .inc();
    }

    /// Update the application uptime gauge
    pub fn update_uptime(&self) {
        self.app_uptime_seconds
            .set(self.start_time.elapsed().as_secs_f64());
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families)
    }
}
