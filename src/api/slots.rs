//! Available slots endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::slot::{SlotQuery, TimeSlot},
};

/// Candidate slots for a provider, date and service duration
#[utoipa::path(
    get,
    path = "/available-slots",
    tag = "availability",
    params(SlotQuery),
    responses(
        (status = 200, description = "Candidate slots flagged against existing appointments", body = Vec<TimeSlot>),
        (status = 400, description = "Invalid duration", body = crate::error::ErrorResponse),
        (status = 404, description = "Provider not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn available_slots(
    State(state): State<crate::AppState>,
    Query(query): Query<SlotQuery>,
) -> AppResult<Json<Vec<TimeSlot>>> {
    let slots = state
        .services
        .availability
        .available_slots(query.provider, query.date, query.service_duration)
        .await?;
    Ok(Json(slots))
}
