//! Shared core of the court booking services
//!
//! Holds the domain model, the persistence traits with their PostgreSQL and
//! in-memory implementations, token handling and the authorization gate.
//! Both the `auth` and `api` binaries depend on this crate.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     println!("Database health check: {}", health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

pub mod authz;
pub mod calendar;
pub mod database;
pub mod error;
pub mod models;
pub mod password;
pub mod repositories;
pub mod token;
pub mod validation;

pub use error::{DomainError, DomainResult};
