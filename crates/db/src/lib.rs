//! Accord persistence layer.
//!
//! Models are plain `FromRow` structs; repositories are zero-sized structs
//! providing async methods over `&PgPool`. Every lifecycle transition
//! (share, review, approve, reject, amend, confirm, accept-invitation) runs
//! inside a transaction that first locks the owning contract row with
//! `SELECT ... FOR UPDATE`, so per-contract mutations are serialized and a
//! contract can never be activated twice.

pub mod error;
pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub use error::DbError;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Cheap connectivity check, used by the health endpoint and at startup.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
