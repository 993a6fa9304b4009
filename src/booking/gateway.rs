//! Collaborator contracts consumed by the booking core

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::GatewayError;
use crate::models::{Appointment, CreateBooking, Provider, Service, TimeSlot, WorkingDate};

/// Read-only catalog of services and their duration/price options
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>, GatewayError>;
}

/// Read-only directory of providers working at a branch
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    async fn list_providers(
        &self,
        branch_id: i32,
        service_id: Option<i32>,
    ) -> Result<Vec<Provider>, GatewayError>;
}

/// Source of truth for working calendars and candidate slots
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Full override list of a provider, no date filter
    async fn working_dates(&self, provider_id: i32) -> Result<Vec<WorkingDate>, GatewayError>;

    /// Candidate slots, already flagged against committed appointments
    async fn available_slots(
        &self,
        provider_id: i32,
        date: NaiveDate,
        service_duration: i32,
    ) -> Result<Vec<TimeSlot>, GatewayError>;
}

/// Single write path for appointments
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn create_booking(&self, request: &CreateBooking) -> Result<Appointment, GatewayError>;
}
