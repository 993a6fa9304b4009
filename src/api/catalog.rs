//! Catalog API endpoints (services, providers, working dates)

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        provider::{Provider, ProviderQuery},
        service::Service,
        working_date::WorkingDate,
    },
};

/// List bookable services with their duration options
#[utoipa::path(
    get,
    path = "/services",
    tag = "catalog",
    responses(
        (status = 200, description = "Services", body = Vec<Service>)
    )
)]
pub async fn list_services(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Service>>> {
    let services = state.services.catalog.list_services().await?;
    Ok(Json(services))
}

/// List providers working at a branch
#[utoipa::path(
    get,
    path = "/providers",
    tag = "catalog",
    params(ProviderQuery),
    responses(
        (status = 200, description = "Providers", body = Vec<Provider>)
    )
)]
pub async fn list_providers(
    State(state): State<crate::AppState>,
    Query(query): Query<ProviderQuery>,
) -> AppResult<Json<Vec<Provider>>> {
    let providers = state
        .services
        .catalog
        .list_providers(query.branch, query.service)
        .await?;
    Ok(Json(providers))
}

/// List working-date overrides of a provider
#[utoipa::path(
    get,
    path = "/providers/{id}/working-dates",
    tag = "catalog",
    params(("id" = i32, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Working dates", body = Vec<WorkingDate>),
        (status = 404, description = "Provider not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn working_dates(
    State(state): State<crate::AppState>,
    Path(provider_id): Path<i32>,
) -> AppResult<Json<Vec<WorkingDate>>> {
    let dates = state.services.catalog.working_dates(provider_id).await?;
    Ok(Json(dates))
}
