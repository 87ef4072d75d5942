//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use common::token::Identity;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::auth_middleware,
    models::{
        AgendaQuery, CreateCourtRequest, CreateGuardRequest, RequestListQuery,
        StatusChangeResponse, UpdateStatusRequest,
    },
    state::AppState,
};

/// Identity attached by [`auth_middleware`]
type Caller = Option<Extension<Identity>>;

fn actor(caller: &Caller) -> Option<&Identity> {
    caller.as_ref().map(|Extension(identity)| identity)
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.frontend_url);

    let protected_routes = Router::new()
        .route("/requests", post(create_request))
        .route("/requests/my", get(list_my_requests))
        .route("/admin/requests", get(list_all_requests))
        .route("/admin/requests/:id/status", patch(update_request_status))
        .route("/admin/guards", post(create_guard))
        .route("/guard/agenda", get(guard_agenda))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
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
        "service": "api-service",
        "database": database,
    }))
}

/// Submit a court request (STUDENT)
pub async fn create_request(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreateCourtRequest>,
) -> ApiResult<impl IntoResponse> {
    let created = state.request_service.create(actor(&caller), payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// The caller's own requests (STUDENT)
pub async fn list_my_requests(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<impl IntoResponse> {
    let requests = state.request_service.list_own(actor(&caller)).await?;
    Ok(Json(requests))
}

/// All requests with optional filters (ADMIN)
pub async fn list_all_requests(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<impl IntoResponse> {
    let requests = state.request_service.list_all(actor(&caller), query).await?;
    Ok(Json(requests))
}

/// Decide on a request and return the owner notification (ADMIN)
pub async fn update_request_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid request id: {}", id)))?;

    let transition = state
        .request_service
        .transition(actor(&caller), id, payload)
        .await?;

    Ok(Json(StatusChangeResponse::new(
        transition.request,
        transition.notification,
    )))
}

/// Provision a GUARD account (ADMIN)
pub async fn create_guard(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreateGuardRequest>,
) -> ApiResult<impl IntoResponse> {
    let guard = state
        .guard_service
        .create_guard(actor(&caller), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(guard)))
}

/// Approved requests for one day (GUARD)
pub async fn guard_agenda(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<AgendaQuery>,
) -> ApiResult<impl IntoResponse> {
    let requests = state
        .request_service
        .agenda(actor(&caller), query.date.as_deref())
        .await?;
    Ok(Json(requests))
}
