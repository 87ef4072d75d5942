//! Configuration for the API service

use anyhow::Result;
use common::{database::DatabaseConfig, token::JwtConfig};

use crate::notification::NotificationConfig;

/// Full service configuration, built once in `main`
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub notification: NotificationConfig,
    /// Allowed CORS origin
    pub frontend_url: String,
    pub port: u16,
}

impl ServiceConfig {
    /// # Environment Variables
    /// - `FRONTEND_URL`: Allowed CORS origin (default: http://localhost:5173)
    /// - `API_PORT`: Listen port (default: 3001)
    ///
    /// plus everything read by [`DatabaseConfig`], [`JwtConfig`] and
    /// [`NotificationConfig`].
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .unwrap_or(3001);

        Ok(ServiceConfig {
            database: DatabaseConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            notification: NotificationConfig::from_env(),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port,
        })
    }
}
