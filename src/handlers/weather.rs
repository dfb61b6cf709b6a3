//! Weather endpoint handler.

use crate::{
    middleware::RequestId,
    models::{ApiError, Location, WeatherQuery, WeatherResponse},
    services::{ReportResolver, ResolveError},
    utils::{extract_api_key, mask_credential},
};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;

/// Weather endpoint
///
/// Returns the latest report for `city`/`country`, served from the report store
/// when it is fresh and fetched from the provider otherwise. Every call counts
/// against the quota of the `X-API-Key` credential, cache hits included.
#[api_v2_operation(
    summary = "Weather Report Endpoint",
    description = "Returns the current weather description for a city and country. Requires an X-API-Key header; each key may make a limited number of requests per hour.",
    tags("Weather"),
    parameters(
        ("city" = Option<String>, Query, description = "City name (e.g., London)"),
        ("country" = Option<String>, Query, description = "Country (e.g., UK)"),
    ),
    responses(
        (status = 200, description = "Successful response", body = WeatherResponse),
        (status = 400, description = "Bad Request - Missing or blank city, country or API key"),
        (status = 401, description = "Unauthorized - Unknown API key"),
        (status = 429, description = "Too Many Requests - Hourly quota exhausted"),
        (status = 503, description = "Service Unavailable - Weather provider failed or returned invalid data")
    )
)]
pub async fn weather(
    req: HttpRequest,
    query: web::Query<WeatherQuery>,
) -> Result<web::Json<WeatherResponse>, Error> {
    let location = location_from_query(&query)?;

    let api_key = extract_api_key(&req)
        .ok_or_else(|| ApiError::InvalidInput("API key is required".to_string()))?;

    let Some(resolver) = req.app_data::<web::Data<ReportResolver>>() else {
        return Err(ApiError::from(ResolveError::Unexpected(
            "report resolver is not configured".to_string(),
        ))
        .into());
    };

    let request_id = RequestId::from_request(&req);
    tracing::debug!(
        request_id = ?request_id.as_ref().map(|id| id.to_string()),
        api_key = %mask_credential(&api_key),
        location = %location,
        "Resolving weather report"
    );

    let report = resolver
        .resolve(&location, &api_key)
        .await
        .map_err(ApiError::from)?;

    Ok(web::Json(WeatherResponse::from(report)))
}

/// Build a location from query parameters, rejecting missing or blank values
fn location_from_query(query: &WeatherQuery) -> Result<Location, ApiError> {
    let city = required_param(query.city.as_deref(), "city", "City is required")?;
    let country = required_param(query.country.as_deref(), "country", "Country is required")?;
    Ok(Location::new(city, country))
}

fn required_param(value: Option<&str>, name: &str, blank_message: &str) -> Result<String, ApiError> {
    match value {
        None => Err(ApiError::InvalidInput(format!(
            "Required parameter '{name}' is missing"
        ))),
        Some(v) if v.trim().is_empty() => Err(ApiError::InvalidInput(blank_message.to_string())),
        Some(v) => Ok(v.to_string()),
    }
}
