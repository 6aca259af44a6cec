//! Storage layer for the bookings service.
//!
//! Zero-sized repositories in [`repositories`] hold the SQL. The
//! [`BookingRepository`] trait is the seam the HTTP layer talks to, with a
//! Postgres implementation in [`pg`] and an in-memory one in [`memory`]
//! used by tests.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

pub use error::RepoError;
pub use memory::MemoryBookingRepository;
pub use pg::PgBookingRepository;
pub use store::BookingRepository;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
