//! Booking endpoint: the single write path for appointments

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::appointment::{Appointment, CreateBooking},
};

/// Create a booking
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Appointment created", body = Appointment),
        (status = 400, description = "Invalid booking", body = crate::error::ErrorResponse),
        (status = 409, description = "Slot already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let appointment = state.services.bookings.create(data).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}
