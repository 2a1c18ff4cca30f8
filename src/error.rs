//! Errors surfaced to landing API clients.
//!
//! Every failure renders as `{"error": {"code", "message", "details"?}}`.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::services::http_service::UpstreamError;

/// `Unauthorized`, `Forbidden` and `Internal` are never raised by the
/// anonymous landing handlers. They complete the error body contract shared
/// with the authenticated GlobeTrotter routes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request input
    #[error("{message}")]
    Validation {
        code: &'static str,
        message: String,
        details: Option<Value>,
    },

    /// Response contract only
    #[error("{0}")]
    Unauthorized(String),

    /// Response contract only
    #[error("{0}")]
    Forbidden(String),

    /// Anonymous request budget exhausted; `wait` is in seconds
    #[error("Too many requests")]
    RateLimited { wait: u64 },

    /// A required provider has no credentials
    #[error("{0}")]
    ServiceUnavailable(String),

    /// A provider call failed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Response contract only
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// `validation_error` with a `{field: problem}` details map.
    pub fn invalid_fields(problems: Map<String, Value>) -> Self {
        ApiError::Validation {
            code: "validation_error",
            message: "Validation error".to_string(),
            details: Some(Value::Object(problems)),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { code, .. } => *code,
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::RateLimited { .. } => "rate_limited",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Upstream(_) => "upstream_error",
            ApiError::Internal => "server_error",
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::Validation { details, .. } => details.clone(),
            ApiError::RateLimited { wait } => Some(json!({ "wait": wait })),
            ApiError::Unauthorized(_)
            | ApiError::Forbidden(_)
            | ApiError::ServiceUnavailable(_)
            | ApiError::Internal => None,
            ApiError::Upstream(e) => Some(json!({
                "status": e.status,
                "details": e.details,
            })),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut error = json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        if let Some(details) = self.details() {
            error["details"] = details;
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": error }))
    }
}
