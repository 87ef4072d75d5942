//! User repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::{DatabaseError, DomainError, DomainResult};
use crate::models::{PendingVerification, Role, User};

use super::{StagedUser, UserStore};

const USER_COLUMNS: &str = r#"
    id, name, email, username, password_hash, role, whatsapp, birth_date,
    email_verified, verification_code, verification_expires, created_at
"#;

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(&self, column: &str, value: &str) -> DomainResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);

        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        self.find_where("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        self.find_where("username", username).await
    }

    async fn stage(&self, user: User) -> DomainResult<Box<dyn StagedUser>> {
        info!("Staging new {} user: {}", user.role, user.email);

        let mut tx = self.pool.begin().await.map_err(query_error)?;
        let (code, expires) = match &user.verification {
            Some(pending) => (Some(pending.code.clone()), Some(pending.expires_at)),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, username, password_hash, role, whatsapp, birth_date,
                email_verified, verification_code, verification_expires, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.whatsapp)
        .bind(user.birth_date)
        .bind(user.email_verified)
        .bind(code)
        .bind(expires)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(write_error)?;

        Ok(Box::new(PgStagedUser { tx: Some(tx), user }))
    }

    async fn mark_verified(&self, id: Uuid) -> DomainResult<()> {
        info!("Marking user {} as verified", id);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_verified = TRUE, verification_code = NULL, verification_expires = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("User not found"));
        }

        Ok(())
    }
}

/// A user row inserted inside an open transaction
struct PgStagedUser {
    tx: Option<Transaction<'static, Postgres>>,
    user: User,
}

#[async_trait]
impl StagedUser for PgStagedUser {
    fn user(&self) -> &User {
        &self.user
    }

    async fn commit(&mut self) -> DomainResult<User> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| DomainError::Dependency("Staged user already settled".to_string()))?;
        tx.commit().await.map_err(write_error)?;

        Ok(self.user.clone())
    }

    async fn rollback(&mut self) -> DomainResult<()> {
        if let Some(tx) = self.tx.take() {
            info!("Rolling back staged user: {}", self.user.email);
            tx.rollback().await.map_err(query_error)?;
        }

        Ok(())
    }
}

pub(crate) fn query_error(e: sqlx::Error) -> DomainError {
    DomainError::Database(DatabaseError::Query(e))
}

/// Translate unique violations into conflicts; everything else is a query error
fn write_error(e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let message = match db.constraint() {
                Some(name) if name.contains("username") => "Username already registered",
                _ => "Email already registered",
            };
            return DomainError::conflict(message);
        }
    }

    query_error(e)
}

fn user_from_row(row: &PgRow) -> DomainResult<User> {
    let role: String = row.try_get("role").map_err(query_error)?;
    let role = role
        .parse::<Role>()
        .map_err(|e| DomainError::Database(DatabaseError::Corrupt(e)))?;

    let code: Option<String> = row.try_get("verification_code").map_err(query_error)?;
    let expires_at: Option<DateTime<Utc>> =
        row.try_get("verification_expires").map_err(query_error)?;
    let verification = match (code, expires_at) {
        (Some(code), Some(expires_at)) => Some(PendingVerification { code, expires_at }),
        _ => None,
    };

    Ok(User {
        id: row.try_get("id").map_err(query_error)?,
        name: row.try_get("name").map_err(query_error)?,
        email: row.try_get("email").map_err(query_error)?,
        username: row.try_get("username").map_err(query_error)?,
        password_hash: row.try_get("password_hash").map_err(query_error)?,
        role,
        whatsapp: row.try_get("whatsapp").map_err(query_error)?,
        birth_date: row.try_get("birth_date").map_err(query_error)?,
        email_verified: row.try_get("email_verified").map_err(query_error)?,
        verification,
        created_at: row.try_get("created_at").map_err(query_error)?,
    })
}
