//! Error types shared by the court booking services
//!
//! `DatabaseError` covers storage failures. `DomainError` carries the error
//! kinds surfaced to callers; each service maps them onto transport codes.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A stored value could not be mapped back into the domain model
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Why an email verification attempt was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    AlreadyVerified,
    MissingCode,
    CodeMismatch,
    Expired,
}

impl VerificationFailure {
    pub fn message(self) -> &'static str {
        match self {
            VerificationFailure::AlreadyVerified => "Email has already been verified",
            VerificationFailure::MissingCode => "No verification code on file",
            VerificationFailure::CodeMismatch => "Invalid verification code",
            VerificationFailure::Expired => "Verification code has expired",
        }
    }
}

/// Errors surfaced by the booking core
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed or out-of-policy input
    #[error("{0}")]
    Validation(String),

    /// Duplicate email or username
    #[error("{0}")]
    Conflict(String),

    /// Unknown user or request
    #[error("{0}")]
    NotFound(String),

    /// Bad credentials, missing or expired token
    #[error("{0}")]
    Authentication(String),

    /// The caller's role is not permitted to run the operation
    #[error("{0}")]
    Authorization(String),

    /// Wrong, expired or missing verification code
    #[error("{}", .0.message())]
    Verification(VerificationFailure),

    /// Valid STUDENT credentials on an account that was never verified
    #[error("Verify your email before signing in")]
    UnverifiedAccount,

    /// An outbound collaborator (email transport) failed
    #[error("{0}")]
    Dependency(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }
}

/// Type alias for Result with DomainError
pub type DomainResult<T> = Result<T, DomainError>;
