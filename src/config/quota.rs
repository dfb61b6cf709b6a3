//! Per-credential quota configuration.

use std::env;

/// Credentials registered when no `API_KEYS` variable is present.
const DEFAULT_API_KEYS: [&str; 5] = ["API_KEY_1", "API_KEY_2", "API_KEY_3", "API_KEY_4", "API_KEY_5"];

/// Longest accepted quota window (365 days).
pub const MAX_WINDOW_SECONDS: u64 = 365 * 24 * 3600;

/// Configuration for the credential quota gate
///
/// The registered credential set is fixed for the lifetime of the gate built from
/// this configuration.
#[derive(Clone, Debug)]
pub struct QuotaConfig {
    pub api_keys: Vec<String>,
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            api_keys: DEFAULT_API_KEYS.iter().map(|k| k.to_string()).collect(),
            max_requests: 5,
            window_seconds: 3600,
        }
    }
}

impl QuotaConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_keys = env::var("API_KEYS")
            .ok()
            .map(|v| parse_api_keys(&v))
            .filter(|keys| !keys.is_empty())
            .unwrap_or(defaults.api_keys);

        let max_requests = env::var("QUOTA_MAX_REQUESTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_requests);

        let window_seconds = env::var("QUOTA_WINDOW_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs: &u64| (1..=MAX_WINDOW_SECONDS).contains(secs))
            .unwrap_or(defaults.window_seconds);

        Self {
            api_keys,
            max_requests,
            window_seconds,
        }
    }
}

/// Split a comma-separated credential list, dropping blanks and duplicates
fn parse_api_keys(raw: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for key in raw.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        if !keys.iter().any(|existing| existing == key) {
            keys.push(key.to_string());
        }
    }
    keys
}
