//! Application state shared across handlers

use common::token::JwtService;
use sqlx::PgPool;
use std::sync::Arc;

use crate::{guards::GuardService, requests::RequestService};

#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub request_service: Arc<RequestService>,
    pub guard_service: Arc<GuardService>,
    /// Pinged by `/health`; absent when running on the in-memory store
    pub db_pool: Option<PgPool>,
    /// Allowed CORS origin
    pub frontend_url: String,
}
