//! Appointment model and booking request

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A committed, conflict-checked booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i32,
    pub provider_id: i32,
    pub branch_id: i32,
    pub service_id: i32,
    /// Duration in minutes
    pub duration: i32,
    pub price: Decimal,
    #[sqlx(rename = "appointment_date")]
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    /// Derived: start_time + duration
    pub end_time: NaiveTime,
    #[sqlx(rename = "client_name")]
    pub name: String,
    #[sqlx(rename = "client_phone")]
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Create booking request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub branch: i32,
    pub service_id: i32,
    /// Duration in minutes
    #[validate(range(min = 1, message = "Service duration must be positive"))]
    pub service_duration: i32,
    pub service_price: Decimal,
    pub provider_id: i32,
    /// Appointment start in business civil time
    pub datetime: NaiveDateTime,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
}

/// Appointment ready to be written, after request validation
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub provider_id: i32,
    pub branch_id: i32,
    pub service_id: i32,
    pub duration: i32,
    pub price: Decimal,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub name: String,
    pub phone: String,
}

/// End of a same-day appointment, or `None` when it would cross midnight
pub fn end_time(start: NaiveTime, duration_minutes: i32) -> Option<NaiveTime> {
    if duration_minutes <= 0 {
        return None;
    }
    let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(duration_minutes as i64));
    // Same-day appointments only
    if wrapped != 0 {
        return None;
    }
    Some(end)
}

/// Whether `[a_start, a_end)` and `[b_start, b_end)` intersect
pub fn overlaps(a: (NaiveTime, NaiveTime), b: (NaiveTime, NaiveTime)) -> bool {
    a.0 < b.1 && b.0 < a.1
}
