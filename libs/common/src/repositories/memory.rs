//! In-process store implementing both persistence traits
//!
//! Used by the service tests and for running a service without PostgreSQL.
//! Uniqueness of email and username is enforced at commit time, the same
//! point where the database constraint would fire.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{CourtRequest, RequestFilter, RequestStatus, RequestWithOwner, User};

use super::{CourtRequestStore, StagedUser, UserStore};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    requests: HashMap<Uuid, CourtRequest>,
}

impl MemoryState {
    fn conflict_for(&self, candidate: &User) -> Option<DomainError> {
        self.users.values().find_map(|existing| {
            if existing.email == candidate.email {
                Some(DomainError::conflict("Email already registered"))
            } else if existing.username.is_some() && existing.username == candidate.username {
                Some(DomainError::conflict("Username already registered"))
            } else {
                None
            }
        })
    }

    fn with_owner(&self, request: &CourtRequest) -> DomainResult<RequestWithOwner> {
        let owner = self
            .users
            .get(&request.user_id)
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        Ok(RequestWithOwner {
            request: request.clone(),
            user: owner.to_public(),
        })
    }

    fn collect<F>(&self, keep: F) -> DomainResult<Vec<RequestWithOwner>>
    where
        F: Fn(&CourtRequest) -> bool,
    {
        self.requests
            .values()
            .filter(|request| keep(request))
            .map(|request| self.with_owner(request))
            .collect()
    }
}

fn newest_first(items: &mut [RequestWithOwner]) {
    items.sort_by(|a, b| {
        b.request
            .date
            .cmp(&a.request.date)
            .then(b.request.created_at.cmp(&a.request.created_at))
    });
}

/// Shared in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username.as_deref() == Some(username))
            .cloned())
    }

    async fn stage(&self, user: User) -> DomainResult<Box<dyn StagedUser>> {
        Ok(Box::new(MemoryStagedUser {
            state: Arc::clone(&self.state),
            user,
            settled: false,
        }))
    }

    async fn mark_verified(&self, id: Uuid) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        user.email_verified = true;
        user.verification = None;
        Ok(())
    }
}

struct MemoryStagedUser {
    state: Arc<Mutex<MemoryState>>,
    user: User,
    settled: bool,
}

#[async_trait]
impl StagedUser for MemoryStagedUser {
    fn user(&self) -> &User {
        &self.user
    }

    async fn commit(&mut self) -> DomainResult<User> {
        if self.settled {
            return Err(DomainError::Dependency(
                "Staged user already settled".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        if let Some(conflict) = state.conflict_for(&self.user) {
            return Err(conflict);
        }

        state.users.insert(self.user.id, self.user.clone());
        self.settled = true;
        Ok(self.user.clone())
    }

    async fn rollback(&mut self) -> DomainResult<()> {
        self.settled = true;
        Ok(())
    }
}

#[async_trait]
impl CourtRequestStore for MemoryStore {
    async fn insert(&self, request: CourtRequest) -> DomainResult<RequestWithOwner> {
        let mut state = self.state.lock().await;
        let created = state.with_owner(&request)?;
        state.requests.insert(request.id, request);
        Ok(created)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: RequestStatus,
        admin_observation: Option<&str>,
    ) -> DomainResult<Option<RequestWithOwner>> {
        let mut state = self.state.lock().await;
        let Some(request) = state.requests.get_mut(&id) else {
            return Ok(None);
        };

        request.status = status;
        request.admin_observation = admin_observation.map(str::to_string);
        let updated = request.clone();

        state.with_owner(&updated).map(Some)
    }

    async fn list_by_owner(&self, user_id: Uuid) -> DomainResult<Vec<RequestWithOwner>> {
        let state = self.state.lock().await;
        let mut items = state.collect(|request| request.user_id == user_id)?;
        newest_first(&mut items);
        Ok(items)
    }

    async fn list(&self, filter: &RequestFilter) -> DomainResult<Vec<RequestWithOwner>> {
        let state = self.state.lock().await;
        let mut items = state.collect(|request| filter.matches(request))?;
        newest_first(&mut items);
        Ok(items)
    }

    async fn list_approved_on(&self, day: NaiveDate) -> DomainResult<Vec<RequestWithOwner>> {
        let state = self.state.lock().await;
        let mut items = state.collect(|request| {
            request.status == RequestStatus::Approved && request.date == day
        })?;
        items.sort_by(|a, b| {
            a.request
                .start_time
                .cmp(&b.request.start_time)
                .then(a.request.created_at.cmp(&b.request.created_at))
        });
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn staff(email: &str, username: Option<&str>) -> User {
        User::new_staff(
            Role::Guard,
            "Guard".to_string(),
            email.to_string(),
            username.map(str::to_string),
            "hash".to_string(),
            None,
        )
    }

    #[tokio::test]
    async fn test_staged_user_is_invisible_until_commit() {
        let store = MemoryStore::new();
        let user = staff("g1@ifma.local", Some("g1"));

        let mut staged = store.stage(user.clone()).await.unwrap();
        assert!(store.find_by_email("g1@ifma.local").await.unwrap().is_none());

        staged.commit().await.unwrap();
        assert_eq!(
            store.find_by_username("g1").await.unwrap().map(|u| u.id),
            Some(user.id)
        );
    }

    #[tokio::test]
    async fn test_rolled_back_user_never_appears() {
        let store = MemoryStore::new();

        let mut staged = store.stage(staff("g2@ifma.local", None)).await.unwrap();
        staged.rollback().await.unwrap();

        assert!(store.find_by_email("g2@ifma.local").await.unwrap().is_none());
        assert!(staged.commit().await.is_err());
    }

    #[tokio::test]
    async fn test_duplicates_conflict_at_commit() {
        let store = MemoryStore::new();
        UserStore::insert(&store, staff("dup@ifma.local", Some("dup")))
            .await
            .unwrap();

        let email = UserStore::insert(&store, staff("dup@ifma.local", None)).await;
        assert!(matches!(email, Err(DomainError::Conflict(m)) if m.contains("Email")));

        let username = UserStore::insert(&store, staff("other@ifma.local", Some("dup"))).await;
        assert!(matches!(username, Err(DomainError::Conflict(m)) if m.contains("Username")));
    }

    #[tokio::test]
    async fn test_request_insert_requires_owner() {
        let store = MemoryStore::new();
        let orphan = CourtRequest::pending(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            "08:00".to_string(),
            "09:00".to_string(),
        );

        assert!(matches!(
            CourtRequestStore::insert(&store, orphan).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_request_status_update_returns_none() {
        let store = MemoryStore::new();
        let updated = store
            .set_status(Uuid::new_v4(), RequestStatus::Approved, None)
            .await
            .unwrap();
        assert!(updated.is_none());
    }
}
