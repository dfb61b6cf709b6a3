//! Weather Quota API - current weather by city with per-key request quotas
//!
//! Built with Actix Web and Paperclip. A request for the weather in a city is
//! answered from the report store when a fresh report exists, and fetched from
//! the upstream provider otherwise. Every request is charged against the hourly
//! quota of the caller's API key.
//!
//! ## Architecture
//!
//! - `services/` - quota gate, report resolver and its collaborators
//! - `models/` - report values, request/response models and error bodies
//! - `handlers/` - HTTP request handlers and the app factory
//! - `middleware/` - request IDs and metrics collection
//! - `config/` - configuration structures and environment loading
//! - `utils/` - request inspection helpers
//!
//! ## Quick Start
//!
//! ```no_run
//! use weather_quota_api::{AppState, create_app};
//!
//! #[actix_web::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::from_env()?;
//!     let _app = create_app(state.clone());
//!     // Configure and run the server
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions for convenience
pub use config::{
    LogFormat, LoggingConfig, MetricsConfig, QuotaConfig, ServerConfig, WeatherConfig,
    init_logging,
};
pub use handlers::{
    AppState, StartupError, create_app, create_openapi_spec, get_metrics, health, version,
    weather,
};
pub use middleware::{MetricsMiddleware, RequestId, RequestIdMiddleware};
pub use models::{
    ApiError, ErrorCode, HealthResponse, Location, ProblemDetail, VersionResponse,
    WeatherQuery, WeatherReport, WeatherResponse,
};
pub use services::{
    AppMetrics, Clock, InMemoryReportStore, ManualClock, OpenWeatherClient, PayloadError,
    QuotaGate, RawPayload, ReportResolver, ReportStore, ResilientClient, ResilientClientConfig,
    ResilientClientError, ResolveError, StoreError, SystemClock, UpstreamError, WeatherUpstream,
    validate_payload,
};
pub use utils::{extract_api_key, extract_client_ip, extract_user_agent, mask_credential};
