//! Appointments repository: the single write path for bookings

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::appointment::{Appointment, NewAppointment},
};

#[derive(Clone)]
pub struct AppointmentsRepository {
    pool: Pool<Postgres>,
}

impl AppointmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Committed `[start, end)` intervals of a provider on a date
    pub async fn busy_intervals(
        &self,
        provider_id: i32,
        date: NaiveDate,
    ) -> AppResult<Vec<(NaiveTime, NaiveTime)>> {
        let rows = sqlx::query_as::<_, (NaiveTime, NaiveTime)>(
            r#"
            SELECT start_time, end_time
            FROM appointments
            WHERE provider_id = $1 AND appointment_date = $2
            ORDER BY start_time
            "#,
        )
        .bind(provider_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Atomically create an appointment.
    ///
    /// The provider row is locked for the duration of the transaction so that
    /// concurrent bookings for the same provider are serialized; overlap with a
    /// committed appointment yields `AppError::Conflict` and nothing is written.
    pub async fn create(&self, new: &NewAppointment) -> AppResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM providers WHERE id = $1 FOR UPDATE")
            .bind(new.provider_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Provider {} not found", new.provider_id)))?;

        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM appointments
                WHERE provider_id = $1
                  AND appointment_date = $2
                  AND start_time < $4
                  AND end_time > $3
            )
            "#,
        )
        .bind(new.provider_id)
        .bind(new.date)
        .bind(new.start_time)
        .bind(new.end_time)
        .fetch_one(&mut *tx)
        .await?;

        if taken {
            // Dropping the transaction rolls it back
            return Err(AppError::Conflict(format!(
                "Provider {} is already booked at {} {}",
                new.provider_id, new.date, new.start_time
            )));
        }

        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (
                provider_id, branch_id, service_id, duration, price,
                appointment_date, start_time, end_time, client_name, client_phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(new.provider_id)
        .bind(new.branch_id)
        .bind(new.service_id)
        .bind(new.duration)
        .bind(new.price)
        .bind(new.date)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(&new.name)
        .bind(&new.phone)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(appointment)
    }
}
