//! Authentication middleware for bearer token validation

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::error::DomainError;
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// Validate the bearer token and attach the caller's [`Identity`] to the request
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer
        .ok_or_else(|| DomainError::Authentication("Token not provided".to_string()))?;

    let identity = state.jwt_service.identify(bearer.token()).inspect_err(|e| {
        debug!("Rejected bearer token: {}", e);
    })?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
