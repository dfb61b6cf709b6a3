//! OpenAPI specification generation and app factory.

use crate::{
    config::{MetricsConfig, QuotaConfig, WeatherConfig},
    handlers::{get_metrics, health, version, weather},
    middleware::{MetricsMiddleware, RequestIdMiddleware},
    services::{
        AppMetrics, Clock, InMemoryReportStore, OpenWeatherClient, QuotaGate, ReportResolver,
        ResilientClientConfig, SystemClock,
    },
};
use actix_web::App;
use paperclip::actix::{OpenApiExt, web};
use paperclip::v2::models::{DefaultApiRaw, Info};
use std::sync::Arc;

/// Creates the shared OpenAPI specification for the API
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "Weather Quota API".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: Some(
                "Current weather descriptions by city and country, served from a report cache \
                when fresh and fetched from the upstream provider otherwise.\n\n\
                ## API keys\n\
                Send a registered key in the `X-API-Key` header. Each key may make a fixed number \
                of requests per hourly window (`QUOTA_MAX_REQUESTS`, default 5); cached answers count too.\n\
                \n\
                ## Errors\n\
                Errors use a problem-detail body with a stable `errorCode`:\n\
                - `WA-001` unknown API key (401)\n\
                - `WA-002` quota exhausted (429)\n\
                - `WA-003` invalid input (400)\n\
                - `WA-004` weather provider unavailable (503)\n\
                - `WA-999` unexpected error (500)"
                    .into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Errors raised while wiring the application from the environment
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to create metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Shared state handed to every worker
///
/// Built once per process so that all workers share the same quota counters and
/// report store.
#[derive(Clone)]
pub struct AppState {
    pub resolver: web::Data<ReportResolver>,
    pub metrics: web::Data<AppMetrics>,
    pub metrics_config: web::Data<MetricsConfig>,
}

impl AppState {
    pub fn new(resolver: ReportResolver, metrics: AppMetrics, metrics_config: MetricsConfig) -> Self {
        Self {
            resolver: web::Data::new(resolver),
            metrics: web::Data::new(metrics),
            metrics_config: web::Data::new(metrics_config),
        }
    }

    /// Wire the production components from environment configuration
    pub fn from_env() -> Result<Self, StartupError> {
        let quota_config = QuotaConfig::from_env();
        let weather_config = WeatherConfig::from_env();
        let metrics_config = MetricsConfig::from_env();

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let gate = Arc::new(QuotaGate::new(&quota_config, clock.clone()));
        let store = Arc::new(InMemoryReportStore::new());
        let upstream = Arc::new(OpenWeatherClient::new(
            &weather_config,
            ResilientClientConfig::from_env(),
        )?);
        let metrics = AppMetrics::new()?;

        tracing::info!(
            credentials = quota_config.api_keys.len(),
            max_requests = quota_config.max_requests,
            window_seconds = quota_config.window_seconds,
            freshness_seconds = weather_config.freshness_seconds,
            provider = %weather_config.base_url,
            "Weather resolver configured"
        );

        let resolver = ReportResolver::new(gate, store, upstream, clock, &weather_config)
            .with_metrics(metrics.clone());

        Ok(Self::new(resolver, metrics, metrics_config))
    }
}

/// Creates the application with all routes and middleware
///
/// Used by the server binary and by integration tests. Takes the state by value
/// so it can be called from the `HttpServer` worker factory.
pub fn create_app(
    state: AppState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(RequestIdMiddleware)
        .wrap(MetricsMiddleware)
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(state.resolver)
        .app_data(state.metrics)
        .app_data(state.metrics_config)
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/version").route(web::get().to(version)))
        .service(web::resource("/api/weather").route(web::get().to(weather)))
        .service(web::resource("/api/metrics").route(web::get().to(get_metrics)))
        .with_json_spec_at("/api/spec/v2")
        .build()
}
