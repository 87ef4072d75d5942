//! Configuration for the authentication service
//!
//! Everything is read once in `main` and handed to constructors.

use anyhow::Result;
use chrono::Duration;
use common::{database::DatabaseConfig, token::JwtConfig};

/// Verification codes stay valid for ten minutes
pub const VERIFICATION_TTL_MINUTES: i64 = 10;

/// Policy knobs used by [`crate::service::AuthService`]
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Shared secret required to create ADMIN accounts; empty disables the endpoint
    pub setup_key: String,
    /// Domain STUDENT emails must belong to
    pub student_domain: String,
    pub verification_ttl: Duration,
}

impl AuthSettings {
    /// # Environment Variables
    /// - `SETUP_KEY`: Admin bootstrap secret (default: empty, endpoint refuses everyone)
    /// - `STUDENT_EMAIL_DOMAIN`: Required STUDENT email domain (default: acad.ifma.edu.br)
    pub fn from_env() -> Self {
        AuthSettings {
            setup_key: std::env::var("SETUP_KEY").unwrap_or_default(),
            student_domain: std::env::var("STUDENT_EMAIL_DOMAIN")
                .unwrap_or_else(|_| "acad.ifma.edu.br".to_string()),
            verification_ttl: Duration::minutes(VERIFICATION_TTL_MINUTES),
        }
    }
}

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender mailbox, e.g. `Quadra IFMA <no-reply@ifma.edu.br>`
    pub from: String,
}

impl SmtpConfig {
    /// Returns `None` when `SMTP_HOST` is unset, in which case codes are only logged
    ///
    /// # Environment Variables
    /// - `SMTP_HOST`: SMTP relay host
    /// - `SMTP_PORT`: SMTP relay port (default: 587)
    /// - `SMTP_USERNAME` / `SMTP_PASSWORD`: Relay credentials
    /// - `SMTP_FROM`: Sender mailbox (default: `SMTP_USERNAME`)
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty())?;

        let port = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .unwrap_or(587);

        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let password = std::env::var("SMTP_PASSWORD").unwrap_or_default();
        let from = std::env::var("SMTP_FROM").unwrap_or_else(|_| username.clone());

        Some(SmtpConfig {
            host,
            port,
            username,
            password,
            from,
        })
    }
}

/// Full service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub auth: AuthSettings,
    pub smtp: Option<SmtpConfig>,
    /// Allowed CORS origin
    pub frontend_url: String,
    pub port: u16,
}

impl ServiceConfig {
    /// # Environment Variables
    /// - `FRONTEND_URL`: Allowed CORS origin (default: http://localhost:5173)
    /// - `AUTH_PORT`: Listen port (default: 3000)
    ///
    /// plus everything read by [`DatabaseConfig`], [`JwtConfig`], [`AuthSettings`]
    /// and [`SmtpConfig`].
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("AUTH_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        Ok(ServiceConfig {
            database: DatabaseConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            auth: AuthSettings::from_env(),
            smtp: SmtpConfig::from_env(),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port,
        })
    }
}
