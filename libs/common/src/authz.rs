//! Authorization gate
//!
//! Every role-restricted operation names itself here and the gate decides,
//! in one place, which roles may run it. Authentication is checked first: an
//! anonymous caller is always rejected before any role is looked at.

use tracing::warn;

use crate::error::{DomainError, DomainResult};
use crate::models::Role;
use crate::token::Identity;

const STUDENT_ONLY: &[Role] = &[Role::Student];
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const GUARD_ONLY: &[Role] = &[Role::Guard];

/// Role-restricted operations exposed by the api service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateRequest,
    ListOwnRequests,
    ListAllRequests,
    TransitionStatus,
    CreateGuard,
    ListApprovedForDate,
}

impl Operation {
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Operation::CreateRequest | Operation::ListOwnRequests => STUDENT_ONLY,
            Operation::ListAllRequests | Operation::TransitionStatus | Operation::CreateGuard => {
                ADMIN_ONLY
            }
            Operation::ListApprovedForDate => GUARD_ONLY,
        }
    }
}

/// Deny unless `actor_role` is one of `allowed_roles`
pub fn require_role(actor_role: Role, allowed_roles: &[Role]) -> DomainResult<()> {
    if allowed_roles.contains(&actor_role) {
        Ok(())
    } else {
        Err(DomainError::Authorization(
            "Access denied. Insufficient permissions.".to_string(),
        ))
    }
}

/// Authenticate, then authorize `operation` for the caller
pub fn authorize(actor: Option<&Identity>, operation: Operation) -> DomainResult<&Identity> {
    let actor = actor
        .ok_or_else(|| DomainError::Authentication("User not authenticated".to_string()))?;

    require_role(actor.role, operation.allowed_roles()).inspect_err(|_| {
        warn!(
            "Denied {:?} to user {} with role {}",
            operation, actor.id, actor.role
        );
    })?;

    Ok(actor)
}
