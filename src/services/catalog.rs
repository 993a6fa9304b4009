//! Catalog service: services and providers offered for booking

use crate::{
    error::AppResult,
    models::{provider::Provider, service::Service, working_date::WorkingDate},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List bookable services
    pub async fn list_services(&self) -> AppResult<Vec<Service>> {
        self.repository.catalog.list_services().await
    }

    /// List providers at a branch, optionally only those offering a service
    pub async fn list_providers(&self, branch_id: i32, service_id: Option<i32>) -> AppResult<Vec<Provider>> {
        let records = self.repository.providers.list_for_branch(branch_id, service_id).await?;
        Ok(records.into_iter().map(Provider::from).collect())
    }

    /// Working-date overrides of a provider
    pub async fn working_dates(&self, provider_id: i32) -> AppResult<Vec<WorkingDate>> {
        // Verify provider exists
        self.repository.providers.get_by_id(provider_id).await?;
        self.repository.providers.working_dates(provider_id).await
    }
}
