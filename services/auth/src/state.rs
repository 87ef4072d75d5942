//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::service::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    /// Pinged by `/health`; absent when running on the in-memory store
    pub db_pool: Option<PgPool>,
    /// Allowed CORS origin
    pub frontend_url: String,
}

impl AppState {
    pub fn new(auth_service: AuthService, db_pool: Option<PgPool>, frontend_url: String) -> Self {
        Self {
            auth_service: Arc::new(auth_service),
            db_pool,
            frontend_url,
        }
    }
}
