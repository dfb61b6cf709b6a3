//! Configuration for the upstream HTTP client
//!
//! Provides environment-based configuration for the resilient HTTP client
//! with sensible defaults for production use.

use crate::services::resilient_client::{CircuitBreakerConfig, ResilientClientConfig};
use std::env;

impl ResilientClientConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let read_timeout_seconds = env::var("RESILIENT_CLIENT_READ_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let connect_timeout_seconds = env::var("RESILIENT_CLIENT_CONNECT_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let enable_detailed_logging = env::var("RESILIENT_CLIENT_DETAILED_LOGGING")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);

        Self {
            read_timeout_seconds,
            connect_timeout_seconds,
            circuit_breaker: CircuitBreakerConfig::from_env(),
            enable_detailed_logging,
        }
    }
}

impl CircuitBreakerConfig {
    /// Load circuit breaker configuration from environment variables
    pub fn from_env() -> Self {
        let failure_threshold = env::var("RESILIENT_CLIENT_CB_FAILURE_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let success_threshold = env::var("RESILIENT_CLIENT_CB_SUCCESS_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let timeout_seconds = env::var("RESILIENT_CLIENT_CB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Self {
            failure_threshold,
            success_threshold,
            timeout_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_resilient_client_config_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();

        unsafe {
            env::remove_var("RESILIENT_CLIENT_READ_TIMEOUT");
            env::remove_var("RESILIENT_CLIENT_CONNECT_TIMEOUT");
            env::remove_var("RESILIENT_CLIENT_DETAILED_LOGGING");
            env::remove_var("RESILIENT_CLIENT_CB_FAILURE_THRESHOLD");
            env::remove_var("RESILIENT_CLIENT_CB_SUCCESS_THRESHOLD");
            env::remove_var("RESILIENT_CLIENT_CB_TIMEOUT_SECONDS");
        }

        let config = ResilientClientConfig::from_env();
        assert_eq!(config.read_timeout_seconds, 5);
        assert_eq!(config.connect_timeout_seconds, 3);
        assert!(config.enable_detailed_logging);
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert_eq!(config.circuit_breaker.timeout_seconds, 60);
    }

    #[test]
    fn test_resilient_client_config_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap();

        unsafe {
            env::set_var("RESILIENT_CLIENT_READ_TIMEOUT", "2");
            env::set_var("RESILIENT_CLIENT_DETAILED_LOGGING", "false");
            env::set_var("RESILIENT_CLIENT_CB_FAILURE_THRESHOLD", "10");
        }

        let config = ResilientClientConfig::from_env();
        assert_eq!(config.read_timeout_seconds, 2);
        assert!(!config.enable_detailed_logging);
        assert_eq!(config.circuit_breaker.failure_threshold, 10);

        unsafe {
            env::remove_var("RESILIENT_CLIENT_READ_TIMEOUT");
            env::remove_var("RESILIENT_CLIENT_DETAILED_LOGGING");
            env::remove_var("RESILIENT_CLIENT_CB_FAILURE_THRESHOLD");
        }
    }
}
