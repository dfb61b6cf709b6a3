//! Report resolution and upstream provider configuration.

use std::env;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Configuration for the cache-or-fetch weather pipeline
#[derive(Clone, Debug)]
pub struct WeatherConfig {
    /// Maximum age in seconds of a stored report that is still served
    pub freshness_seconds: i64,
    /// Current-weather endpoint of the upstream provider
    pub base_url: String,
    /// Provider key; when absent the caller's credential is forwarded
    pub provider_api_key: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            freshness_seconds: 3600,
            base_url: DEFAULT_BASE_URL.to_string(),
            provider_api_key: None,
        }
    }
}

impl WeatherConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let freshness_seconds = env::var("WEATHER_FRESHNESS_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs: &i64| *secs >= 0)
            .unwrap_or(3600);

        let base_url =
            env::var("OPENWEATHER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let provider_api_key = env::var("OPENWEATHER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Self {
            freshness_seconds,
            base_url,
            provider_api_key,
        }
    }
}
