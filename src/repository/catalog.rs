//! Service catalog repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::service::{DurationOption, DurationRow, Service, ServiceRow},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: Pool<Postgres>,
}

impl CatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all services with their duration options
    pub async fn list_services(&self) -> AppResult<Vec<Service>> {
        let services = sqlx::query_as::<_, ServiceRow>(
            "SELECT id, name, description, default_duration FROM services ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let durations = sqlx::query_as::<_, DurationRow>(
            r#"
            SELECT service_id, duration, price
            FROM service_durations
            ORDER BY service_id, position, duration
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble(services, durations))
    }

    /// Get a service by ID
    pub async fn get_service(&self, id: i32) -> AppResult<Service> {
        let service = sqlx::query_as::<_, ServiceRow>(
            "SELECT id, name, description, default_duration FROM services WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))?;

        let durations = sqlx::query_as::<_, DurationRow>(
            r#"
            SELECT service_id, duration, price
            FROM service_durations
            WHERE service_id = $1
            ORDER BY position, duration
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble(vec![service], durations).remove(0))
    }
}

/// Attach duration rows to their services, keeping row order
fn assemble(services: Vec<ServiceRow>, durations: Vec<DurationRow>) -> Vec<Service> {
    services
        .into_iter()
        .map(|row| Service {
            available_durations: durations
                .iter()
                .filter(|d| d.service_id == row.id)
                .map(|d| DurationOption {
                    duration: d.duration,
                    price: d.price,
                })
                .collect(),
            id: row.id,
            name: row.name,
            description: row.description,
            default_duration: row.default_duration,
        })
        .collect()
}
