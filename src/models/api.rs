//! API request and response models for standard endpoints.

use crate::models::WeatherReport;
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Response model for the health check endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response model for the version information endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct VersionResponse {
    pub version: String,
    pub commit: String,
    pub build_time: String,
}

/// Request query parameters for the weather endpoint
///
/// Both fields are optional at the extractor level so that missing and blank
/// values are reported through the same problem-detail body.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Apiv2Schema)]
pub struct WeatherQuery {
    /// City name (e.g., "London")
    pub city: Option<String>,
    /// Country code or name (e.g., "UK")
    pub country: Option<String>,
}

/// Response body of the weather endpoint
///
/// Flat record: `{id, city, country, description, timestamp}`, with `timestamp`
/// in seconds since the Unix epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Apiv2Schema)]
pub struct WeatherResponse {
    pub id: Option<u64>,
    pub city: String,
    pub country: String,
    pub description: String,
    pub timestamp: i64,
}

impl From<WeatherReport> for WeatherResponse {
    fn from(report: WeatherReport) -> Self {
        Self {
            id: report.id,
            city: report.location.city,
            country: report.location.country,
            description: report.description,
            timestamp: report.observed_at,
        }
    }
}
