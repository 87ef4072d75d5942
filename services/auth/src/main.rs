use anyhow::Result;
use common::{
    database::{health_check, init_pool, run_migrations},
    repositories::{UserRepository, UserStore},
    token::JwtService,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod error;
mod mailer;
mod models;
mod routes;
mod service;
mod state;
mod verification;

use crate::{
    config::ServiceConfig,
    mailer::{ConsoleMailer, SmtpMailer, VerificationMailer},
    service::AuthService,
    state::AppState,
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

    info!("Starting authentication service");

    let config = ServiceConfig::from_env()?;

    // Initialize database connection pool
    let pool = init_pool(&config.database).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let mailer: Arc<dyn VerificationMailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp, config.auth.verification_ttl)?),
        None => {
            warn!("SMTP_HOST not set; verification codes will only be logged");
            Arc::new(ConsoleMailer)
        }
    };

    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool.clone()));
    let auth_service = AuthService::new(
        users,
        mailer,
        JwtService::new(config.jwt.clone()),
        config.auth.clone(),
    );

    let app_state = AppState::new(auth_service, Some(pool), config.frontend_url.clone());

    // Start the web server
    let app = routes::create_router(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Authentication service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
