//! User model and related functionality

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// A verification code waiting to be confirmed, together with its expiry
///
/// Code and expiry are stored as a pair: either both are present or neither is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingVerification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub whatsapp: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email_verified: bool,
    pub verification: Option<PendingVerification>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered STUDENT, unverified until the code is confirmed
    pub fn new_student(
        name: String,
        email: String,
        password_hash: String,
        whatsapp: String,
        birth_date: NaiveDate,
        verification: PendingVerification,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            username: None,
            password_hash,
            role: Role::Student,
            whatsapp: Some(whatsapp),
            birth_date: Some(birth_date),
            email_verified: false,
            verification: Some(verification),
            created_at: Utc::now(),
        }
    }

    /// An ADMIN or GUARD account, verified on creation
    pub fn new_staff(
        role: Role,
        name: String,
        email: String,
        username: Option<String>,
        password_hash: String,
        whatsapp: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            username,
            password_hash,
            role,
            whatsapp,
            birth_date: None,
            email_verified: true,
            verification: None,
            created_at: Utc::now(),
        }
    }

    /// Whether this account may sign in given its verification state
    pub fn can_sign_in(&self) -> bool {
        !self.role.requires_email_verification() || self.email_verified
    }

    pub fn to_public(&self) -> PublicUser {
        PublicUser::from(self)
    }
}

/// User data safe to return to callers (no secret hash, no verification code)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub role: Role,
    pub whatsapp: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            whatsapp: user.whatsapp.clone(),
            birth_date: user.birth_date,
        }
    }
}
