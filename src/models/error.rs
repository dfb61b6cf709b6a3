//! Error codes and problem-detail responses returned to API clients.

use crate::services::weather::ResolveError;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Stable error codes exposed in every error body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidApiKey,
    RateLimitExceeded,
    InvalidInput,
    ExternalApiError,
    UnknownError,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::InvalidApiKey => "WA-001",
            ErrorCode::RateLimitExceeded => "WA-002",
            ErrorCode::InvalidInput => "WA-003",
            ErrorCode::ExternalApiError => "WA-004",
            ErrorCode::UnknownError => "WA-999",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ErrorCode::InvalidApiKey => "INVALID_API_KEY",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::ExternalApiError => "EXTERNAL_API_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ErrorCode::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::ExternalApiError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Problem-detail error body
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(rename = "errorCode")]
    pub error_code: String,
}

impl ProblemDetail {
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            problem_type: "about:blank".to_string(),
            title: code.title().to_string(),
            status: code.status().as_u16(),
            detail: detail.into(),
            error_code: code.code().to_string(),
        }
    }
}

/// Errors surfaced by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ApiError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::InvalidInput(_) => ErrorCode::InvalidInput,
            ApiError::Resolve(err) => err.error_code(),
        }
    }

    /// Message safe to show to clients
    pub fn detail(&self) -> String {
        match self {
            ApiError::InvalidInput(message) => message.clone(),
            ApiError::Resolve(ResolveError::Unexpected(_)) => {
                "An unexpected error occurred".to_string()
            }
            ApiError::Resolve(err) => err.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.error_code().status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("application/problem+json")
            .json(ProblemDetail::new(self.error_code(), self.detail()))
    }
}
