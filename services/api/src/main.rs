use anyhow::Result;
use common::{
    database::{health_check, init_pool, run_migrations},
    repositories::{CourtRequestRepository, UserRepository},
    token::JwtService,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod error;
mod guards;
mod middleware;
mod models;
mod notification;
mod requests;
mod routes;
mod state;

use crate::{
    config::ServiceConfig, guards::GuardService, notification::NotificationFormatter,
    requests::RequestService, state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting API service");

    let config = ServiceConfig::from_env()?;

    // Initialize database connection pool
    let pool = init_pool(&config.database).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    // Initialize services
    let request_service = RequestService::new(
        Arc::new(CourtRequestRepository::new(pool.clone())),
        NotificationFormatter::new(config.notification.clone()),
    );
    let guard_service = GuardService::new(Arc::new(UserRepository::new(pool.clone())));

    let app_state = AppState {
        jwt_service: JwtService::new(config.jwt.clone()),
        request_service: Arc::new(request_service),
        guard_service: Arc::new(guard_service),
        db_pool: Some(pool),
        frontend_url: config.frontend_url.clone(),
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
