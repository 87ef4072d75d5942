//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{DomainError, DomainResult};

/// Validate a display name
pub fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Name is required"));
    }

    Ok(())
}

/// Validate username
pub fn validate_username(username: &str) -> DomainResult<()> {
    if username.chars().count() < 3 {
        return Err(DomainError::validation(
            "Username must be at least 3 characters long",
        ));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> DomainResult<()> {
    if email.is_empty() {
        return Err(DomainError::validation("Email is required"));
    }

    if email.len() > 254 {
        return Err(DomainError::validation(
            "Email must be at most 254 characters long",
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(DomainError::validation("Invalid email format"));
    }

    Ok(())
}

/// Validate a STUDENT email: well formed and inside the institutional domain
pub fn validate_student_email(email: &str, domain: &str) -> DomainResult<()> {
    validate_email(email)?;

    if !email.ends_with(&format!("@{}", domain)) {
        return Err(DomainError::validation(format!(
            "Email must belong to the @{} domain",
            domain
        )));
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < 6 {
        return Err(DomainError::validation(
            "Password must be at least 6 characters long",
        ));
    }

    Ok(())
}

/// Validate a verification code as typed by the user
pub fn validate_code(code: &str) -> DomainResult<()> {
    if code.chars().count() != 4 {
        return Err(DomainError::validation("Code must have 4 digits"));
    }

    Ok(())
}

/// Validate a required free-text field
pub fn require(value: &str, message: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(message));
    }

    Ok(())
}
