//! GUARD account provisioning

use common::{
    authz::{Operation, authorize},
    error::{DomainError, DomainResult},
    models::{PublicUser, Role, User},
    password::hash_password,
    repositories::UserStore,
    token::Identity,
    validation::{validate_email, validate_name, validate_password, validate_username},
};
use std::sync::Arc;
use tracing::info;

use crate::models::CreateGuardRequest;

/// Email stored for a GUARD created with a username only
pub fn placeholder_email(username: &str) -> String {
    format!("vigia.{}@ifma.local", username)
}

pub struct GuardService {
    users: Arc<dyn UserStore>,
}

impl GuardService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Create a verified GUARD; ADMIN only
    pub async fn create_guard(
        &self,
        actor: Option<&Identity>,
        input: CreateGuardRequest,
    ) -> DomainResult<PublicUser> {
        let actor = authorize(actor, Operation::CreateGuard)?;

        validate_name(&input.name)?;
        let email = trimmed(input.email);
        let username = trimmed(input.username);

        let login_name = match (&email, &username) {
            (None, None) => return Err(DomainError::validation("Email or username is required")),
            (Some(email), _) => email.clone(),
            (None, Some(username)) => placeholder_email(username),
        };
        if let Some(email) = &email {
            validate_email(email)?;
        }
        if let Some(username) = &username {
            validate_username(username)?;
        }
        validate_password(&input.password)?;

        if let Some(email) = &email {
            if self.users.find_by_email(email).await?.is_some() {
                return Err(DomainError::conflict("Email already registered"));
            }
        }
        if let Some(username) = &username {
            if self.users.find_by_username(username).await?.is_some() {
                return Err(DomainError::conflict("Username already registered"));
            }
        }

        let guard = User::new_staff(
            Role::Guard,
            input.name.trim().to_string(),
            login_name,
            username,
            hash_password(&input.password)?,
            trimmed(input.whatsapp),
        );
        let guard = self.users.insert(guard).await?;

        info!("Admin {} created guard {}", actor.id, guard.id);
        Ok(guard.to_public())
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
