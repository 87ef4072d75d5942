//! JWT service for token generation and validation
//!
//! Tokens are HS256-signed, carry `{sub, email, role}` and are valid for a
//! configurable window (seven days by default). The auth service issues them;
//! the api service only validates them.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{Role, User};

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared signing secret
    pub secret: String,
    /// Token expiration time in seconds (default: 7 days)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Secret used to sign and verify tokens
    /// - `JWT_TOKEN_EXPIRY`: Token expiry in seconds (default: 604800)
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        if secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let token_expiry = std::env::var("JWT_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string()) // 7 days
            .parse()
            .unwrap_or(604800);

        Ok(JwtConfig {
            secret,
            token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// The authenticated caller, as recovered from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Generate a token for a user
    pub fn generate_token(&self, user: &User) -> DomainResult<String> {
        let now = unix_now()?;

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now,
            exp: now + self.config.token_expiry,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::Dependency(format!("Failed to sign token: {}", e)))
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> DomainResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| DomainError::Authentication("Invalid or expired token".to_string()))
    }

    /// Validate a token and return the caller it identifies
    pub fn identify(&self, token: &str) -> DomainResult<Identity> {
        self.validate_token(token).map(Identity::from)
    }
}

fn unix_now() -> DomainResult<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| DomainError::Dependency(format!("Failed to get current time: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn service(expiry: u64) -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            token_expiry: expiry,
        })
    }

    fn admin() -> User {
        User::new_staff(
            Role::Admin,
            "Root".to_string(),
            "root@ifma.edu.br".to_string(),
            None,
            "hash".to_string(),
            None,
        )
    }

    #[test]
    fn test_token_carries_identity() {
        let jwt = service(604800);
        let user = admin();

        let token = jwt.generate_token(&user).unwrap();
        let identity = jwt.identify(&token).unwrap();

        assert_eq!(identity.id, user.id);
        assert_eq!(identity.email, "root@ifma.edu.br");
        assert_eq!(identity.role, Role::Admin);

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 604800);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = service(60).generate_token(&admin()).unwrap();
        let other = JwtService::new(JwtConfig {
            secret: "other-secret".to_string(),
            token_expiry: 60,
        });

        assert!(matches!(
            other.validate_token(&token),
            Err(DomainError::Authentication(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = service(60);
        let now = unix_now().unwrap();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "late@acad.ifma.edu.br".to_string(),
            role: Role::Student,
            iat: now - 120,
            exp: now - 60,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &jwt.encoding_key).unwrap();

        assert!(matches!(
            jwt.validate_token(&token),
            Err(DomainError::Authentication(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(service(60).identify("not-a-token").is_err());
    }

    #[test]
    #[serial]
    fn test_jwt_config_from_env() {
        unsafe {
            std::env::set_var("JWT_SECRET", "from-env");
            std::env::remove_var("JWT_TOKEN_EXPIRY");
        }

        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.secret, "from-env");
        assert_eq!(config.token_expiry, 604800);

        unsafe {
            std::env::remove_var("JWT_SECRET");
        }
        assert!(JwtConfig::from_env().is_err());
    }
}
