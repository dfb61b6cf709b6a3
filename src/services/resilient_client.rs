//! HTTP client for the upstream provider with timeouts and circuit breakers.
//!
//! Requests are attempted exactly once. Failures are surfaced to the caller
//! immediately; a per-destination circuit breaker stops calling a host that keeps
//! failing until its cool-down has elapsed.

use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tracing::{info, warn};
use url::Url;

/// Configuration for the resilient HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilientClientConfig {
    /// Timeout for a complete request (in seconds)
    pub read_timeout_seconds: u64,

    /// Connection timeout (in seconds)
    pub connect_timeout_seconds: u64,

    /// Circuit breaker configuration
    pub circuit_breaker: CircuitBreakerConfig,

    /// Enable detailed logging
    pub enable_detailed_logging: bool,
}

impl Default for ResilientClientConfig {
    fn default() -> Self {
        Self {
            read_timeout_seconds: 5,
            connect_timeout_seconds: 3,
            circuit_breaker: CircuitBreakerConfig::default(),
            enable_detailed_logging: true,
        }
    }
}

/// Simple circuit breaker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Failure threshold to open the circuit
    pub failure_threshold: usize,

    /// Success threshold to close the circuit
    pub success_threshold: usize,

    /// Timeout before attempting to close circuit (in seconds)
    pub timeout_seconds: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            timeout_seconds: 60,
        }
    }
}

/// Circuit breaker state
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Simple circuit breaker implementation
#[derive(Debug)]
pub struct SimpleCircuitBreaker {
    state: CircuitBreakerState,
    failure_count: usize,
    success_count: usize,
    config: CircuitBreakerConfig,
    last_failure_time: Option<Instant>,
}

impl SimpleCircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: CircuitBreakerState::Closed,
            failure_count: 0,
            success_count: 0,
            config,
            last_failure_time: None,
        }
    }

    pub fn call_allowed(&mut self) -> bool {
        match self.state {
            CircuitBreakerState::Closed | CircuitBreakerState::HalfOpen => true,
            CircuitBreakerState::Open => {
                let cooled_down = self.last_failure_time.is_some_and(|last| {
                    last.elapsed() >= Duration::from_secs(self.config.timeout_seconds)
                });
                if cooled_down {
                    self.state = CircuitBreakerState::HalfOpen;
                    self.success_count = 0;
                }
                cooled_down
            }
        }
    }

    pub fn on_success(&mut self) {
        self.failure_count = 0;

        if self.state == CircuitBreakerState::HalfOpen {
            self.success_count += 1;
            if self.success_count >= self.config.success_threshold {
                self.state = CircuitBreakerState::Closed;
            }
        }
    }

    pub fn on_failure(&mut self) {
        self.failure_count += 1;
        self.last_failure_time = Some(Instant::now());

        // A failed probe reopens the circuit straight away
        if self.state == CircuitBreakerState::HalfOpen
            || self.failure_count >= self.config.failure_threshold
        {
            self.state = CircuitBreakerState::Open;
        }
    }

    pub fn state(&self) -> &CircuitBreakerState {
        &self.state
    }
}

/// HTTP client with per-destination circuit breakers
///
/// Safe to share between concurrent requests.
#[derive(Debug)]
pub struct ResilientClient {
    client: Client,
    config: ResilientClientConfig,
    circuit_breakers: Mutex<HashMap<String, SimpleCircuitBreaker>>,
}

impl ResilientClient {
    pub fn new(config: ResilientClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.read_timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            circuit_breakers: Mutex::new(HashMap::new()),
        })
    }

    /// GET `url` and decode the body as JSON
    ///
    /// An empty body or a JSON `null` yields `Ok(None)`.
    pub async fn get_json(
        &self,
        url: &Url,
    ) -> Result<Option<serde_json::Value>, ResilientClientError> {
        let destination = extract_destination(url);

        if !self.call_allowed(&destination) {
            warn!(destination = %destination, "Circuit breaker is open, rejecting request");
            return Err(ResilientClientError::CircuitBreakerOpen);
        }

        let start = Instant::now();
        let result = self.send(url).await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            Ok(_) => {
                if self.config.enable_detailed_logging {
                    info!(
                        destination = %destination,
                        duration_ms = duration_ms,
                        "Upstream request completed successfully"
                    );
                }
                self.record_outcome(&destination, true);
            }
            Err(err) => {
                if self.config.enable_detailed_logging {
                    warn!(
                        destination = %destination,
                        duration_ms = duration_ms,
                        error = %err,
                        "Upstream request failed"
                    );
                }
                self.record_outcome(&destination, !err.trips_breaker());
            }
        }

        result
    }

    async fn send(&self, url: &Url) -> Result<Option<serde_json::Value>, ResilientClientError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResilientClientError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        decode_body(&body)
    }

    fn call_allowed(&self, destination: &str) -> bool {
        let mut breakers = self.circuit_breakers.lock();
        breakers
            .entry(destination.to_string())
            .or_insert_with(|| SimpleCircuitBreaker::new(self.config.circuit_breaker.clone()))
            .call_allowed()
    }

    fn record_outcome(&self, destination: &str, success: bool) {
        let mut breakers = self.circuit_breakers.lock();
        if let Some(cb) = breakers.get_mut(destination) {
            if success {
                cb.on_success();
            } else {
                cb.on_failure();
            }
        }
    }

    /// Current breaker state for `destination`, if it has been contacted
    pub fn circuit_state(&self, destination: &str) -> Option<CircuitBreakerState> {
        self.circuit_breakers
            .lock()
            .get(destination)
            .map(|cb| cb.state().clone())
    }
}

/// Destination (host) used to group circuit breakers
fn extract_destination(url: &Url) -> String {
    url.host_str().unwrap_or("unknown").to_string()
}

fn decode_body(body: &[u8]) -> Result<Option<serde_json::Value>, ResilientClientError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    match serde_json::from_slice(body) {
        Ok(serde_json::Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(ResilientClientError::Decode(e.to_string())),
    }
}

/// Errors that can occur with the resilient client
#[derive(Debug, thiserror::Error)]
pub enum ResilientClientError {
    #[error("Network error: {0}")]
    NetworkError(reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Circuit breaker is open")]
    CircuitBreakerOpen,

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ResilientClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ResilientClientError::Timeout
        } else {
            ResilientClientError::NetworkError(err)
        }
    }
}

impl ResilientClientError {
    /// Whether the failure points at an unhealthy destination
    ///
    /// Client-side statuses (e.g. unknown city) and malformed bodies do not count
    /// against the breaker.
    fn trips_breaker(&self) -> bool {
        match self {
            ResilientClientError::NetworkError(_) | ResilientClientError::Timeout => true,
            ResilientClientError::Status(status) => *status >= 500,
            ResilientClientError::CircuitBreakerOpen | ResilientClientError::Decode(_) => false,
        }
    }

    /// Get a user-friendly error message for API responses
    pub fn user_message(&self) -> String {
        match self {
            ResilientClientError::NetworkError(_) => {
                "Weather provider unreachable due to network issues".to_string()
            }
            ResilientClientError::Timeout => "Weather provider timed out".to_string(),
            ResilientClientError::CircuitBreakerOpen => {
                "Weather provider temporarily unavailable, please try again later".to_string()
            }
            ResilientClientError::Status(status) => {
                format!("Weather provider returned error status {status}")
            }
            ResilientClientError::Decode(_) => {
                "Weather provider returned an unreadable response".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ResilientClientConfig::default();
        assert_eq!(config.read_timeout_seconds, 5);
        assert_eq!(config.connect_timeout_seconds, 3);
        assert!(config.enable_detailed_logging);
    }

    #[test]
    fn test_extract_destination() {
        let url = Url::parse("https://api.openweathermap.org/data/2.5/weather").unwrap();
        assert_eq!(extract_destination(&url), "api.openweathermap.org");
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b"").unwrap(), None);
        assert_eq!(decode_body(b"  \n").unwrap(), None);
        assert_eq!(decode_body(b"null").unwrap(), None);
        assert_eq!(
            decode_body(br#"{"weather":[]}"#).unwrap(),
            Some(serde_json::json!({"weather": []}))
        );
        assert!(matches!(
            decode_body(b"<html>"),
            Err(ResilientClientError::Decode(_))
        ));
    }

    #[test]
    fn test_circuit_breaker() {
        let mut cb = SimpleCircuitBreaker::new(CircuitBreakerConfig::default());

        assert_eq!(cb.state(), &CircuitBreakerState::Closed);
        assert!(cb.call_allowed());

        for _ in 0..5 {
            cb.on_failure();
        }

        assert_eq!(cb.state(), &CircuitBreakerState::Open);
        assert!(!cb.call_allowed());

        // Success resets the failure count but does not close an open circuit
        cb.on_success();
        assert_eq!(cb.state(), &CircuitBreakerState::Open);
    }

    #[test]
    fn test_half_open_probe_failure_reopens() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 1,
            timeout_seconds: 0,
        };
        let mut cb = SimpleCircuitBreaker::new(config);

        cb.on_failure();
        assert!(cb.call_allowed(), "zero cool-down allows a probe immediately");
        assert_eq!(cb.state(), &CircuitBreakerState::HalfOpen);

        cb.on_failure();
        assert_eq!(cb.state(), &CircuitBreakerState::Open);

        assert!(cb.call_allowed());
        cb.on_success();
        assert_eq!(cb.state(), &CircuitBreakerState::Closed);
    }

    #[test]
    fn test_breaker_classification() {
        assert!(ResilientClientError::Timeout.trips_breaker());
        assert!(ResilientClientError::Status(503).trips_breaker());
        assert!(!ResilientClientError::Status(404).trips_breaker());
        assert!(!ResilientClientError::Decode("x".into()).trips_breaker());
    }

    #[test]
    fn test_error_user_messages() {
        assert!(ResilientClientError::Timeout.user_message().contains("timed out"));
        assert!(
            ResilientClientError::CircuitBreakerOpen
                .user_message()
                .contains("try again later")
        );
    }
}
