//! Weather report value types.

use std::fmt;

/// A (city, country) pair used as the report cache key
///
/// Case is preserved: `"Paris"/"FR"` and `"paris"/"fr"` are distinct locations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub city: String,
    pub country: String,
}

impl Location {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.city, self.country)
    }
}

/// An observed weather report
///
/// Reports are never mutated once built. A newer report for the same location
/// supersedes older ones; the store keeps both. Clients see it through
/// `WeatherResponse`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeatherReport {
    /// Identifier assigned by the store on save
    pub id: Option<u64>,
    pub location: Location,
    /// Short condition summary (e.g., "scattered clouds")
    pub description: String,
    /// Capture time in seconds since the Unix epoch
    pub observed_at: i64,
}

impl WeatherReport {
    /// Build an unsaved report
    pub fn new(location: Location, description: impl Into<String>, observed_at: i64) -> Self {
        Self {
            id: None,
            location,
            description: description.into(),
            observed_at,
        }
    }

    /// Copy of this report carrying a store-assigned identifier
    pub fn with_id(self, id: u64) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    /// Age in seconds relative to `now_epoch_seconds`
    pub fn age_seconds(&self, now_epoch_seconds: i64) -> i64 {
        now_epoch_seconds - self.observed_at
    }
}
