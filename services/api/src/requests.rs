//! Reservation lifecycle and role-scoped listings
//!
//! Every operation passes through the authorization gate before touching the
//! store. Transitions overwrite status and observation unconditionally, so a
//! terminal request may be decided again; the last write wins.

use common::{
    authz::{Operation, authorize},
    calendar,
    error::{DomainError, DomainResult},
    models::{CourtRequest, Decision, RequestFilter, RequestStatus, RequestWithOwner},
    repositories::CourtRequestStore,
    token::Identity,
    validation::require,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    models::{CreateCourtRequest, RequestListQuery, UpdateStatusRequest},
    notification::{Notification, NotificationFormatter},
};

/// A decided request and the message to forward to its owner
#[derive(Debug, Clone)]
pub struct Transition {
    pub request: RequestWithOwner,
    pub notification: Notification,
}

pub struct RequestService {
    requests: Arc<dyn CourtRequestStore>,
    notifier: NotificationFormatter,
}

impl RequestService {
    pub fn new(requests: Arc<dyn CourtRequestStore>, notifier: NotificationFormatter) -> Self {
        Self { requests, notifier }
    }

    /// Submit a PENDING request for today or a later day
    pub async fn create(
        &self,
        actor: Option<&Identity>,
        input: CreateCourtRequest,
    ) -> DomainResult<RequestWithOwner> {
        let actor = authorize(actor, Operation::CreateRequest)?;

        let day = calendar::parse_day(&input.date)?;
        require(&input.start_time, "Start time is required")?;
        require(&input.end_time, "End time is required")?;

        if day < calendar::today() {
            return Err(DomainError::validation(
                "Cannot create a request for a past date",
            ));
        }

        let created = self
            .requests
            .insert(CourtRequest::pending(
                actor.id,
                day,
                input.start_time.trim().to_string(),
                input.end_time.trim().to_string(),
            ))
            .await?;

        info!(
            "Student {} requested the court on {} ({} to {})",
            actor.id, day, created.request.start_time, created.request.end_time
        );
        Ok(created)
    }

    /// The caller's own requests, newest date first
    pub async fn list_own(&self, actor: Option<&Identity>) -> DomainResult<Vec<RequestWithOwner>> {
        let actor = authorize(actor, Operation::ListOwnRequests)?;
        self.requests.list_by_owner(actor.id).await
    }

    /// Every request, optionally filtered by status and an inclusive day range
    pub async fn list_all(
        &self,
        actor: Option<&Identity>,
        query: RequestListQuery,
    ) -> DomainResult<Vec<RequestWithOwner>> {
        authorize(actor, Operation::ListAllRequests)?;

        let filter = RequestFilter {
            status: non_empty(query.status.as_deref())
                .map(|s| s.parse::<RequestStatus>().map_err(DomainError::Validation))
                .transpose()?,
            date_from: non_empty(query.date_from.as_deref())
                .map(calendar::parse_day)
                .transpose()?,
            date_to: non_empty(query.date_to.as_deref())
                .map(calendar::parse_day)
                .transpose()?,
        };

        self.requests.list(&filter).await
    }

    /// Approve, reject or cancel a request and render the owner notification
    pub async fn transition(
        &self,
        actor: Option<&Identity>,
        id: Uuid,
        input: UpdateStatusRequest,
    ) -> DomainResult<Transition> {
        let actor = authorize(actor, Operation::TransitionStatus)?;

        let decision: Decision = input.status.parse().map_err(DomainError::Validation)?;
        let observation = input.admin_observation.filter(|v| !v.is_empty());

        let request = self
            .requests
            .set_status(id, decision.status(), observation.as_deref())
            .await?
            .ok_or_else(|| DomainError::not_found("Request not found"))?;

        info!(
            "Admin {} set request {} to {}",
            actor.id,
            id,
            decision.status()
        );

        let notification = self.notifier.notify(&request);
        Ok(Transition {
            request,
            notification,
        })
    }

    /// Approved requests on one day, earliest start first
    pub async fn agenda(
        &self,
        actor: Option<&Identity>,
        date: Option<&str>,
    ) -> DomainResult<Vec<RequestWithOwner>> {
        authorize(actor, Operation::ListApprovedForDate)?;

        let date = non_empty(date)
            .ok_or_else(|| DomainError::validation("Query parameter \"date\" is required (YYYY-MM-DD)"))?;
        let day = calendar::parse_day(date)?;

        self.requests.list_approved_on(day).await
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use common::{
        models::{Role, User},
        repositories::{MemoryStore, UserStore},
    };

    pub(crate) fn identity(user: &User) -> Identity {
        Identity {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }

    pub(crate) fn staff(role: Role, email: &str) -> User {
        User::new_staff(
            role,
            format!("{} user", role),
            email.to_string(),
            None,
            "hash".to_string(),
            None,
        )
    }

    pub(crate) async fn student(store: &MemoryStore, email: &str, whatsapp: Option<&str>) -> User {
        let mut user = staff(Role::Student, email);
        user.name = "Ana Souza".to_string();
        user.whatsapp = whatsapp.map(str::to_string);
        UserStore::insert(store, user).await.unwrap()
    }

    fn service(store: &MemoryStore) -> RequestService {
        RequestService::new(Arc::new(store.clone()), NotificationFormatter::default())
    }

    fn booking(day: NaiveDate) -> CreateCourtRequest {
        CreateCourtRequest {
            date: day.format("%Y-%m-%d").to_string(),
            start_time: "18:00".to_string(),
            end_time: "19:00".to_string(),
        }
    }

    fn decide(status: &str, observation: Option<&str>) -> UpdateStatusRequest {
        UpdateStatusRequest {
            status: status.to_string(),
            admin_observation: observation.map(str::to_string),
        }
    }

    /// Seed a request directly, bypassing the past-date rule
    async fn seed(store: &MemoryStore, owner: &User, day: NaiveDate, status: RequestStatus, start: &str) -> Uuid {
        let mut request = CourtRequest::pending(owner.id, day, start.to_string(), "23:00".to_string());
        request.status = status;
        let id = request.id;
        CourtRequestStore::insert(store, request).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_today_and_future_are_pending() {
        let store = MemoryStore::new();
        let owner = student(&store, "a@acad.ifma.edu.br", None).await;
        let service = service(&store);
        let today = calendar::today();

        for day in [today, today + Duration::days(1), today + Duration::days(90)] {
            let created = service
                .create(Some(&identity(&owner)), booking(day))
                .await
                .unwrap();
            assert_eq!(created.request.status, RequestStatus::Pending);
            assert_eq!(created.request.admin_observation, None);
            assert_eq!(created.request.date, day);
            assert_eq!(created.user.id, owner.id);
        }
    }

    #[tokio::test]
    async fn test_past_dates_are_rejected() {
        let store = MemoryStore::new();
        let owner = student(&store, "b@acad.ifma.edu.br", None).await;
        let service = service(&store);
        let yesterday = calendar::today() - Duration::days(1);

        let result = service.create(Some(&identity(&owner)), booking(yesterday)).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let stamped = CreateCourtRequest {
            date: format!("{}T23:59:00Z", yesterday.format("%Y-%m-%d")),
            ..booking(yesterday)
        };
        let result = service.create(Some(&identity(&owner)), stamped).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_creation_input_rules() {
        let store = MemoryStore::new();
        let owner = student(&store, "c@acad.ifma.edu.br", None).await;
        let service = service(&store);
        let actor = identity(&owner);
        let tomorrow = calendar::today() + Duration::days(1);

        let bad_date = CreateCourtRequest {
            date: "next friday".to_string(),
            ..booking(tomorrow)
        };
        assert!(matches!(
            service.create(Some(&actor), bad_date).await,
            Err(DomainError::Validation(_))
        ));

        let no_start = CreateCourtRequest {
            start_time: " ".to_string(),
            ..booking(tomorrow)
        };
        assert!(matches!(
            service.create(Some(&actor), no_start).await,
            Err(DomainError::Validation(m)) if m.contains("Start")
        ));
    }

    #[tokio::test]
    async fn test_overlapping_requests_coexist() {
        let store = MemoryStore::new();
        let owner = student(&store, "d@acad.ifma.edu.br", None).await;
        let service = service(&store);
        let tomorrow = calendar::today() + Duration::days(1);

        for _ in 0..3 {
            service
                .create(Some(&identity(&owner)), booking(tomorrow))
                .await
                .unwrap();
        }
        assert_eq!(service.list_own(Some(&identity(&owner))).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_gate_precedes_every_operation() {
        let store = MemoryStore::new();
        let owner = student(&store, "e@acad.ifma.edu.br", None).await;
        let guard = identity(&staff(Role::Guard, "guard@ifma.local"));
        let admin = identity(&staff(Role::Admin, "admin@ifma.edu.br"));
        let service = service(&store);
        let tomorrow = calendar::today() + Duration::days(1);

        assert!(matches!(
            service.create(None, booking(tomorrow)).await,
            Err(DomainError::Authentication(_))
        ));
        assert!(matches!(
            service.create(Some(&admin), booking(tomorrow)).await,
            Err(DomainError::Authorization(_))
        ));
        assert!(matches!(
            service.list_all(Some(&identity(&owner)), RequestListQuery::default()).await,
            Err(DomainError::Authorization(_))
        ));
        assert!(matches!(
            service
                .transition(Some(&guard), Uuid::new_v4(), decide("APPROVED", None))
                .await,
            Err(DomainError::Authorization(_))
        ));
        assert!(matches!(
            service.agenda(Some(&admin), Some("2025-06-01")).await,
            Err(DomainError::Authorization(_))
        ));
        assert!(matches!(
            service.list_own(Some(&guard)).await,
            Err(DomainError::Authorization(_))
        ));
    }

    #[tokio::test]
    async fn test_transition_round_trip() {
        let store = MemoryStore::new();
        let owner = student(&store, "f@acad.ifma.edu.br", Some("(98) 99999-9999")).await;
        let admin = identity(&staff(Role::Admin, "admin@ifma.edu.br"));
        let service = service(&store);
        let day = calendar::today() + Duration::days(2);
        let id = seed(&store, &owner, day, RequestStatus::Pending, "18:00").await;

        let transition = service
            .transition(Some(&admin), id, decide("APPROVED", Some("X")))
            .await
            .unwrap();
        assert_eq!(transition.request.request.status, RequestStatus::Approved);
        assert!(
            transition
                .notification
                .link
                .unwrap()
                .starts_with("https://wa.me/5598999999999?text=")
        );

        let all = service
            .list_all(Some(&admin), RequestListQuery::default())
            .await
            .unwrap();
        let own = service.list_own(Some(&identity(&owner))).await.unwrap();
        for listed in [&all[0], &own[0]] {
            assert_eq!(listed.request.status, RequestStatus::Approved);
            assert_eq!(listed.request.admin_observation.as_deref(), Some("X"));
        }
    }

    #[tokio::test]
    async fn test_transition_is_idempotent_and_permissive() {
        let store = MemoryStore::new();
        let owner = student(&store, "g@acad.ifma.edu.br", None).await;
        let admin = identity(&staff(Role::Admin, "admin@ifma.edu.br"));
        let service = service(&store);
        let id = seed(&store, &owner, calendar::today(), RequestStatus::Pending, "08:00").await;

        let first = service
            .transition(Some(&admin), id, decide("REJECTED", Some("Maintenance")))
            .await
            .unwrap();
        let second = service
            .transition(Some(&admin), id, decide("REJECTED", Some("Maintenance")))
            .await
            .unwrap();
        assert_eq!(first.request, second.request);
        assert_eq!(first.notification, second.notification);

        let reopened = service
            .transition(Some(&admin), id, decide("APPROVED", Some("")))
            .await
            .unwrap();
        assert_eq!(reopened.request.request.status, RequestStatus::Approved);
        assert_eq!(reopened.request.request.admin_observation, None);
        assert!(reopened.notification.link.is_none());
        assert!(!reopened.notification.message.is_empty());
    }

    #[tokio::test]
    async fn test_observation_is_stored_verbatim() {
        let store = MemoryStore::new();
        let owner = student(&store, "i@acad.ifma.edu.br", None).await;
        let admin = identity(&staff(Role::Admin, "admin@ifma.edu.br"));
        let service = service(&store);
        let id = seed(&store, &owner, calendar::today(), RequestStatus::Pending, "08:00").await;

        let cancelled = service
            .transition(Some(&admin), id, decide("CANCELLED", Some("  Bring ID\n")))
            .await
            .unwrap();
        assert_eq!(
            cancelled.request.request.admin_observation.as_deref(),
            Some("  Bring ID\n")
        );

        let own = service.list_own(Some(&identity(&owner))).await.unwrap();
        assert_eq!(own[0].request.admin_observation.as_deref(), Some("  Bring ID\n"));
    }

    #[tokio::test]
    async fn test_transition_errors() {
        let store = MemoryStore::new();
        let owner = student(&store, "h@acad.ifma.edu.br", None).await;
        let admin = identity(&staff(Role::Admin, "admin@ifma.edu.br"));
        let service = service(&store);
        let id = seed(&store, &owner, calendar::today(), RequestStatus::Pending, "08:00").await;

        let pending = service
            .transition(Some(&admin), id, decide("PENDING", None))
            .await;
        assert!(matches!(pending, Err(DomainError::Validation(_))));

        let unknown = service
            .transition(Some(&admin), Uuid::new_v4(), decide("CANCELLED", None))
            .await;
        assert!(matches!(unknown, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_single_day_filter_is_inclusive() {
        let store = MemoryStore::new();
        let owner = student(&store, "i@acad.ifma.edu.br", None).await;
        let admin = identity(&staff(Role::Admin, "admin@ifma.edu.br"));
        let service = service(&store);

        let may_31 = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
        let june_1 = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let june_2 = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        seed(&store, &owner, may_31, RequestStatus::Pending, "10:00").await;
        let a = seed(&store, &owner, june_1, RequestStatus::Pending, "10:00").await;
        let b = seed(&store, &owner, june_1, RequestStatus::Approved, "20:00").await;
        seed(&store, &owner, june_2, RequestStatus::Pending, "10:00").await;

        let query = RequestListQuery {
            status: None,
            date_from: Some("2025-06-01".to_string()),
            date_to: Some("2025-06-01".to_string()),
        };
        let mut ids: Vec<Uuid> = service
            .list_all(Some(&admin), query.clone())
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.request.id)
            .collect();
        ids.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(ids, expected);

        let approved = service
            .list_all(
                Some(&admin),
                RequestListQuery {
                    status: Some("APPROVED".to_string()),
                    ..query
                },
            )
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].request.id, b);

        let bad_status = service
            .list_all(
                Some(&admin),
                RequestListQuery {
                    status: Some("DONE".to_string()),
                    ..RequestListQuery::default()
                },
            )
            .await;
        assert!(matches!(bad_status, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_listings_are_ordered() {
        let store = MemoryStore::new();
        let owner = student(&store, "j@acad.ifma.edu.br", None).await;
        let admin = identity(&staff(Role::Admin, "admin@ifma.edu.br"));
        let guard = identity(&staff(Role::Guard, "guard@ifma.local"));
        let service = service(&store);
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        seed(&store, &owner, day, RequestStatus::Approved, "20:00").await;
        seed(&store, &owner, day, RequestStatus::Approved, "07:00").await;
        seed(&store, &owner, day, RequestStatus::Rejected, "06:00").await;
        seed(&store, &owner, day + Duration::days(1), RequestStatus::Approved, "05:00").await;
        seed(&store, &owner, day - Duration::days(3), RequestStatus::Pending, "05:00").await;

        let agenda = service.agenda(Some(&guard), Some("2025-06-01")).await.unwrap();
        let starts: Vec<&str> = agenda.iter().map(|i| i.request.start_time.as_str()).collect();
        assert_eq!(starts, vec!["07:00", "20:00"]);

        let all = service
            .list_all(Some(&admin), RequestListQuery::default())
            .await
            .unwrap();
        assert!(all.windows(2).all(|w| w[0].request.date >= w[1].request.date));

        let own = service.list_own(Some(&identity(&owner))).await.unwrap();
        assert_eq!(own.len(), 5);
        assert!(own.windows(2).all(|w| w[0].request.date >= w[1].request.date));
    }

    #[tokio::test]
    async fn test_agenda_requires_date() {
        let store = MemoryStore::new();
        let guard = identity(&staff(Role::Guard, "guard@ifma.local"));
        let service = service(&store);

        assert!(matches!(
            service.agenda(Some(&guard), None).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.agenda(Some(&guard), Some("June")).await,
            Err(DomainError::Validation(_))
        ));
        assert!(service.agenda(Some(&guard), Some("2030-01-01")).await.unwrap().is_empty());
    }
}
