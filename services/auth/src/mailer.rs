//! Outbound verification email
//!
//! [`SmtpMailer`] relays through a real SMTP server. [`ConsoleMailer`] only
//! logs the code and is used when no relay is configured.

use async_trait::async_trait;
use chrono::Duration;
use common::error::{DomainError, DomainResult};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use crate::config::SmtpConfig;

/// Capability to deliver a verification code to an address
#[async_trait]
pub trait VerificationMailer: Send + Sync {
    async fn send_verification_code(&self, to: &str, code: &str) -> DomainResult<()>;
}

fn mail_error(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::Dependency(format!("{}: {}", context, e))
}

fn verification_body(code: &str, ttl: Duration) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>Email verification</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #15803d;">IFMA court booking</h2>
        <p>Use the code below to confirm your email address.</p>
        <p style="font-size: 32px; letter-spacing: 8px; font-weight: bold;">{code}</p>
        <p style="color: #666; font-size: 14px;">
            The code expires in {ttl} minutes. If you did not sign up, ignore this email.
        </p>
    </div>
</body>
</html>"#,
        code = code,
        ttl = ttl.num_minutes()
    )
}

/// SMTP mailer using Lettre
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    code_ttl: Duration,
}

impl SmtpMailer {
    /// Build the relay; port 465 uses implicit TLS, anything else STARTTLS
    ///
    /// `code_ttl` is the lifetime quoted in the message body.
    pub fn new(config: &SmtpConfig, code_ttl: Duration) -> DomainResult<Self> {
        let relay = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        };
        let builder = relay.map_err(|e| mail_error("SMTP relay error", e))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
            code_ttl,
        })
    }
}

#[async_trait]
impl VerificationMailer for SmtpMailer {
    async fn send_verification_code(&self, to: &str, code: &str) -> DomainResult<()> {
        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| mail_error("Invalid from address", e))?,
            )
            .to(to.parse().map_err(|e| mail_error("Invalid to address", e))?)
            .subject("Your verification code")
            .header(ContentType::TEXT_HTML)
            .body(verification_body(code, self.code_ttl))
            .map_err(|e| mail_error("Failed to build email", e))?;

        self.transport.send(email).await.map_err(|e| {
            error!("Failed to send verification email to {}: {}", to, e);
            mail_error("Failed to send email", e)
        })?;

        info!("Verification email sent to {}", to);
        Ok(())
    }
}

/// Logs the code instead of sending it
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl VerificationMailer for ConsoleMailer {
    async fn send_verification_code(&self, to: &str, code: &str) -> DomainResult<()> {
        info!(to = %to, code = %code, "Verification email (console mode)");
        Ok(())
    }
}
