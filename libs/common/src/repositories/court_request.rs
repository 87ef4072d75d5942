//! Court request repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::{DatabaseError, DomainError, DomainResult};
use crate::models::{
    CourtRequest, PublicUser, RequestFilter, RequestStatus, RequestWithOwner, Role,
};

use super::CourtRequestStore;
use super::user::query_error;

/// Selects a request joined with its owner; `r` must name a court_requests row set
const SELECT_WITH_OWNER: &str = r#"
    SELECT r.id, r.user_id, r.date, r.start_time, r.end_time, r.status,
           r.admin_observation, r.created_at,
           u.name AS owner_name, u.email AS owner_email, u.username AS owner_username,
           u.role AS owner_role, u.whatsapp AS owner_whatsapp,
           u.birth_date AS owner_birth_date
"#;

/// PostgreSQL-backed court request store
#[derive(Clone)]
pub struct CourtRequestRepository {
    pool: PgPool,
}

impl CourtRequestRepository {
    /// Create a new court request repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourtRequestStore for CourtRequestRepository {
    async fn insert(&self, request: CourtRequest) -> DomainResult<RequestWithOwner> {
        info!(
            "Creating court request for user {} on {}",
            request.user_id, request.date
        );

        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO court_requests (
                    id, user_id, date, start_time, end_time, status, admin_observation, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            {} FROM inserted r JOIN users u ON u.id = r.user_id
            "#,
            SELECT_WITH_OWNER
        );

        let row = sqlx::query(&sql)
            .bind(request.id)
            .bind(request.user_id)
            .bind(request.date)
            .bind(&request.start_time)
            .bind(&request.end_time)
            .bind(request.status.as_str())
            .bind(&request.admin_observation)
            .bind(request.created_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_foreign_key_violation() {
                        return DomainError::not_found("User not found");
                    }
                }
                query_error(e)
            })?;

        row.as_ref()
            .map(request_from_row)
            .transpose()?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: RequestStatus,
        admin_observation: Option<&str>,
    ) -> DomainResult<Option<RequestWithOwner>> {
        info!("Setting court request {} to {}", id, status);

        let sql = format!(
            r#"
            WITH updated AS (
                UPDATE court_requests
                SET status = $2, admin_observation = $3
                WHERE id = $1
                RETURNING *
            )
            {} FROM updated r JOIN users u ON u.id = r.user_id
            "#,
            SELECT_WITH_OWNER
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(admin_observation)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        row.as_ref().map(request_from_row).transpose()
    }

    async fn list_by_owner(&self, user_id: Uuid) -> DomainResult<Vec<RequestWithOwner>> {
        let sql = format!(
            r#"
            {} FROM court_requests r JOIN users u ON u.id = r.user_id
            WHERE r.user_id = $1
            ORDER BY r.date DESC, r.created_at DESC
            "#,
            SELECT_WITH_OWNER
        );

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        rows.iter().map(request_from_row).collect()
    }

    async fn list(&self, filter: &RequestFilter) -> DomainResult<Vec<RequestWithOwner>> {
        let sql = format!(
            r#"
            {} FROM court_requests r JOIN users u ON u.id = r.user_id
            WHERE ($1::text IS NULL OR r.status = $1)
              AND ($2::date IS NULL OR r.date >= $2)
              AND ($3::date IS NULL OR r.date < $3)
            ORDER BY r.date DESC, r.created_at DESC
            "#,
            SELECT_WITH_OWNER
        );

        let rows = sqlx::query(&sql)
            .bind(filter.status.map(RequestStatus::as_str))
            .bind(filter.date_from)
            .bind(filter.date_before())
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        rows.iter().map(request_from_row).collect()
    }

    async fn list_approved_on(&self, day: NaiveDate) -> DomainResult<Vec<RequestWithOwner>> {
        let sql = format!(
            r#"
            {} FROM court_requests r JOIN users u ON u.id = r.user_id
            WHERE r.status = $1 AND r.date >= $2 AND r.date < $3
            ORDER BY r.start_time ASC, r.created_at ASC
            "#,
            SELECT_WITH_OWNER
        );

        let rows = sqlx::query(&sql)
            .bind(RequestStatus::Approved.as_str())
            .bind(day)
            .bind(day.succ_opt())
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        rows.iter().map(request_from_row).collect()
    }
}

fn corrupt(message: String) -> DomainError {
    DomainError::Database(DatabaseError::Corrupt(message))
}

fn request_from_row(row: &PgRow) -> DomainResult<RequestWithOwner> {
    let status: String = row.try_get("status").map_err(query_error)?;
    let owner_role: String = row.try_get("owner_role").map_err(query_error)?;

    let request = CourtRequest {
        id: row.try_get("id").map_err(query_error)?,
        user_id: row.try_get("user_id").map_err(query_error)?,
        date: row.try_get("date").map_err(query_error)?,
        start_time: row.try_get("start_time").map_err(query_error)?,
        end_time: row.try_get("end_time").map_err(query_error)?,
        status: status.parse::<RequestStatus>().map_err(corrupt)?,
        admin_observation: row.try_get("admin_observation").map_err(query_error)?,
        created_at: row.try_get("created_at").map_err(query_error)?,
    };

    let user = PublicUser {
        id: request.user_id,
        name: row.try_get("owner_name").map_err(query_error)?,
        email: row.try_get("owner_email").map_err(query_error)?,
        username: row.try_get("owner_username").map_err(query_error)?,
        role: owner_role.parse::<Role>().map_err(corrupt)?,
        whatsapp: row.try_get("owner_whatsapp").map_err(query_error)?,
        birth_date: row.try_get("owner_birth_date").map_err(query_error)?,
    };

    Ok(RequestWithOwner { request, user })
}
