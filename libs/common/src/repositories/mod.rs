//! Persistence seams for users and court requests
//!
//! Services depend on these traits only. `UserRepository` and
//! `CourtRequestRepository` talk to PostgreSQL; `MemoryStore` keeps
//! everything in process and backs the service tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::{CourtRequest, RequestFilter, RequestStatus, RequestWithOwner, User};

pub mod court_request;
pub mod memory;
pub mod user;

pub use court_request::CourtRequestRepository;
pub use memory::MemoryStore;
pub use user::UserRepository;

/// A user write that is invisible to other readers until committed
#[async_trait]
pub trait StagedUser: Send {
    fn user(&self) -> &User;

    /// Make the user visible; duplicates are reported as `DomainError::Conflict`
    async fn commit(&mut self) -> DomainResult<User>;

    /// Discard the write
    async fn rollback(&mut self) -> DomainResult<()>;
}

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    /// Begin a two-phase create
    async fn stage(&self, user: User) -> DomainResult<Box<dyn StagedUser>>;

    /// Create a user in one step
    async fn insert(&self, user: User) -> DomainResult<User> {
        let mut staged = self.stage(user).await?;
        staged.commit().await
    }

    /// Set `email_verified` and clear the verification code and expiry
    async fn mark_verified(&self, id: Uuid) -> DomainResult<()>;
}

/// Court request store
///
/// Writes are last-write-wins; there is no version check.
#[async_trait]
pub trait CourtRequestStore: Send + Sync {
    async fn insert(&self, request: CourtRequest) -> DomainResult<RequestWithOwner>;

    /// Overwrite status and observation; `None` when the id is unknown
    async fn set_status(
        &self,
        id: Uuid,
        status: RequestStatus,
        admin_observation: Option<&str>,
    ) -> DomainResult<Option<RequestWithOwner>>;

    /// All requests of one owner, newest date first
    async fn list_by_owner(&self, user_id: Uuid) -> DomainResult<Vec<RequestWithOwner>>;

    /// All requests matching `filter`, newest date first
    async fn list(&self, filter: &RequestFilter) -> DomainResult<Vec<RequestWithOwner>>;

    /// Approved requests on `day`, earliest start time first
    async fn list_approved_on(&self, day: NaiveDate) -> DomainResult<Vec<RequestWithOwner>>;
}
