//! Providers and working calendar repository

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{provider::ProviderRecord, working_date::WorkingDate},
};

#[derive(Clone)]
pub struct ProvidersRepository {
    pool: Pool<Postgres>,
}

impl ProvidersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List providers of a branch, optionally only those offering a service
    pub async fn list_for_branch(
        &self,
        branch_id: i32,
        service_id: Option<i32>,
    ) -> AppResult<Vec<ProviderRecord>> {
        let rows = sqlx::query_as::<_, ProviderRecord>(
            r#"
            SELECT p.id, p.branch_id, p.name, p.specialty, p.photo_url, p.work_start, p.work_end
            FROM providers p
            WHERE p.branch_id = $1
              AND ($2::int IS NULL OR EXISTS (
                  SELECT 1 FROM provider_services ps
                  WHERE ps.provider_id = p.id AND ps.service_id = $2
              ))
            ORDER BY p.name
            "#,
        )
        .bind(branch_id)
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a provider by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<ProviderRecord> {
        sqlx::query_as::<_, ProviderRecord>(
            r#"
            SELECT id, branch_id, name, specialty, photo_url, work_start, work_end
            FROM providers WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Provider {} not found", id)))
    }

    /// Whether the provider performs the given service
    pub async fn offers_service(&self, provider_id: i32, service_id: i32) -> AppResult<bool> {
        let offers: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM provider_services WHERE provider_id = $1 AND service_id = $2)",
        )
        .bind(provider_id)
        .bind(service_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(offers)
    }

    /// All working-date overrides of a provider, ordered by date
    pub async fn working_dates(&self, provider_id: i32) -> AppResult<Vec<WorkingDate>> {
        let rows = sqlx::query_as::<_, WorkingDate>(
            r#"
            SELECT work_date, active
            FROM provider_working_dates
            WHERE provider_id = $1
            ORDER BY work_date
            "#,
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Whether the provider has an active override for the date
    pub async fn is_working(&self, provider_id: i32, date: NaiveDate) -> AppResult<bool> {
        let active: Option<bool> = sqlx::query_scalar(
            "SELECT active FROM provider_working_dates WHERE provider_id = $1 AND work_date = $2",
        )
        .bind(provider_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(active.unwrap_or(false))
    }
}
