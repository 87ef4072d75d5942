//! Error responses for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DomainError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the authentication service
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        let ApiError::Domain(domain) = self;

        let status = match domain {
            DomainError::Validation(_) | DomainError::Verification(_) => StatusCode::BAD_REQUEST,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Authentication(_) => StatusCode::UNAUTHORIZED,
            DomainError::Authorization(_) | DomainError::UnverifiedAccount => {
                StatusCode::FORBIDDEN
            }
            DomainError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DomainError::Database(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                );
            }
        };

        (status, domain.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for handler results
pub type ApiResult<T> = Result<T, ApiError>;
