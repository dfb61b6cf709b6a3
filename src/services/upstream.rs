//! Upstream weather provider collaborator.

use crate::{
    config::WeatherConfig,
    models::Location,
    services::resilient_client::{ResilientClient, ResilientClientConfig, ResilientClientError},
};
use async_trait::async_trait;
use url::Url;

/// Undecoded provider response; `None` when the provider sent no body
pub type RawPayload = Option<serde_json::Value>;

/// Errors raised while talking to the provider
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{}", .0.user_message())]
    Transport(#[from] ResilientClientError),
}

/// Source of current weather observations
#[async_trait]
pub trait WeatherUpstream: Send + Sync {
    /// Fetch the current conditions for `location` on behalf of `credential`
    async fn fetch(&self, location: &Location, credential: &str)
    -> Result<RawPayload, UpstreamError>;
}

/// OpenWeatherMap current-weather client
pub struct OpenWeatherClient {
    client: ResilientClient,
    base_url: String,
    provider_api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(
        config: &WeatherConfig,
        client_config: ResilientClientConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: ResilientClient::new(client_config)?,
            base_url: config.base_url.clone(),
            provider_api_key: config.provider_api_key.clone(),
        })
    }

    /// Request URL for `location`
    ///
    /// The configured provider key takes precedence over the caller's credential.
    fn request_url(&self, location: &Location, credential: &str) -> Result<Url, url::ParseError> {
        let app_id = self.provider_api_key.as_deref().unwrap_or(credential);
        Url::parse_with_params(
            &self.base_url,
            &[("q", location.to_string().as_str()), ("appid", app_id)],
        )
    }
}

#[async_trait]
impl WeatherUpstream for OpenWeatherClient {
    async fn fetch(
        &self,
        location: &Location,
        credential: &str,
    ) -> Result<RawPayload, UpstreamError> {
        let url = self.request_url(location, credential)?;
        tracing::debug!(location = %location, "Fetching current weather from provider");
        Ok(self.client.get_json(&url).await?)
    }
}
