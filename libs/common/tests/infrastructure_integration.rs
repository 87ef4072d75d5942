//! Integration tests against a live PostgreSQL instance
//!
//! Run with `DATABASE_URL` pointing at a disposable database and
//! `cargo test -- --ignored`.

use chrono::{Duration, NaiveDate, Utc};
use common::{
    calendar,
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    error::DomainError,
    models::{CourtRequest, PendingVerification, RequestFilter, RequestStatus, Role, User},
    repositories::{CourtRequestRepository, CourtRequestStore, UserRepository, UserStore},
};
use sqlx::Row;
use uuid::Uuid;

fn student(tag: &str) -> User {
    User::new_student(
        "Integration Student".to_string(),
        format!("{}-{}@acad.ifma.edu.br", tag, Uuid::new_v4()),
        "hash".to_string(),
        "(98) 98888-7777".to_string(),
        NaiveDate::from_ymd_opt(2003, 4, 12).unwrap(),
        PendingVerification {
            code: "4321".to_string(),
            expires_at: Utc::now() + Duration::minutes(10),
        },
    )
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_database_is_reachable_and_migrated() -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;
    run_migrations(&pool).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT COUNT(*) AS tables FROM information_schema.tables WHERE table_name IN ('users', 'court_requests')")
        .fetch_one(&pool)
        .await?;
    let tables: i64 = row.get("tables");
    assert_eq!(tables, 2);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_staged_user_and_request_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    run_migrations(&pool).await?;

    let users = UserRepository::new(pool.clone());
    let requests = CourtRequestRepository::new(pool.clone());

    // a rolled back registration leaves nothing behind
    let ghost = student("ghost");
    let mut staged = users.stage(ghost.clone()).await?;
    staged.rollback().await?;
    assert!(users.find_by_email(&ghost.email).await?.is_none());

    let owner = users.insert(student("owner")).await?;
    let stored = users.find_by_id(owner.id).await?.ok_or("owner missing")?;
    assert_eq!(stored.role, Role::Student);
    assert_eq!(stored.verification.map(|v| v.code).as_deref(), Some("4321"));

    let duplicate = users.insert(User { id: Uuid::new_v4(), ..owner.clone() }).await;
    assert!(matches!(duplicate, Err(DomainError::Conflict(_))));

    users.mark_verified(owner.id).await?;
    let verified = users.find_by_id(owner.id).await?.ok_or("owner missing")?;
    assert!(verified.email_verified);
    assert!(verified.verification.is_none());

    let day = calendar::today() + Duration::days(3);
    let created = requests
        .insert(CourtRequest::pending(owner.id, day, "18:00".to_string(), "19:00".to_string()))
        .await?;
    assert_eq!(created.request.status, RequestStatus::Pending);
    assert_eq!(created.user.id, owner.id);

    let approved = requests
        .set_status(created.request.id, RequestStatus::Approved, Some("Bring the ball"))
        .await?
        .ok_or("request missing")?;
    assert_eq!(approved.request.admin_observation.as_deref(), Some("Bring the ball"));

    let agenda = requests.list_approved_on(day).await?;
    assert!(agenda.iter().any(|item| item.request.id == created.request.id));

    let filter = RequestFilter {
        status: Some(RequestStatus::Approved),
        date_from: Some(day),
        date_to: Some(day),
    };
    assert!(requests.list(&filter).await?.iter().all(|item| item.request.date == day));
    assert_eq!(requests.list_by_owner(owner.id).await?.len(), 1);

    Ok(())
}
