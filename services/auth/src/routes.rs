//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::{
    error::ApiResult,
    models::{CreateAdminRequest, LoginRequest, RegisterRequest, VerifyEmailRequest},
    state::AppState,
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.frontend_url);

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/verify-email", post(verify_email))
        .route("/auth/create-admin", post(create_admin))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!("Ignoring invalid FRONTEND_URL {:?}; CORS disabled", frontend_url);
            layer
        }
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db_pool {
        Some(pool) => Some(common::database::health_check(pool).await.unwrap_or(false)),
        None => None,
    };

    Json(json!({
        "status": "ok",
        "service": "auth-service",
        "database": database,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = state.auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = state.auth_service.login(payload).await?;
    Ok(Json(response))
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = state.auth_service.verify_email(payload).await?;
    Ok(Json(response))
}

/// Bootstrap an ADMIN account; requires the configured setup key
pub async fn create_admin(
    State(state): State<AppState>,
    Json(payload): Json<CreateAdminRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = state.auth_service.create_admin(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
