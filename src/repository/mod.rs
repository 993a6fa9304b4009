//! Repository layer for database operations

pub mod appointments;
pub mod catalog;
pub mod providers;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub catalog: catalog::CatalogRepository,
    pub providers: providers::ProvidersRepository,
    pub appointments: appointments::AppointmentsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            catalog: catalog::CatalogRepository::new(pool.clone()),
            providers: providers::ProvidersRepository::new(pool.clone()),
            appointments: appointments::AppointmentsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
