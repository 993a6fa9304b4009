//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{bookings, catalog, health, slots};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Salon Booking API",
        version = "1.0.0",
        description = "Catalog, availability and booking REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::list_services,
        catalog::list_providers,
        catalog::working_dates,
        // Availability
        slots::available_slots,
        // Bookings
        bookings::create_booking,
    ),
    components(
        schemas(
            crate::models::service::Service,
            crate::models::service::DurationOption,
            crate::models::provider::Provider,
            crate::models::provider::ProviderQuery,
            crate::models::working_date::WorkingDate,
            crate::models::slot::TimeSlot,
            crate::models::slot::SlotQuery,
            crate::models::appointment::Appointment,
            crate::models::appointment::CreateBooking,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Services, providers and working calendars"),
        (name = "availability", description = "Bookable time slots"),
        (name = "bookings", description = "Appointment booking")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
