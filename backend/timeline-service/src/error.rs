//! Error types for the timeline service.
//!
//! Errors are converted to appropriate HTTP responses for API clients. Store
//! failures surface as `Unavailable` so callers can distinguish a degraded
//! backend from a legitimately empty feed.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for timeline-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid viewer identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A backing store could not be reached or failed mid-request
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The request was cancelled before the page was assembled
    #[error("Request cancelled")]
    Cancelled,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Unavailable(_) | AppError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_error_classes() {
        assert_eq!(
            AppError::Unauthorized("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Unavailable("posts store".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(AppError::Cancelled.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
