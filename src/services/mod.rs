//! Business logic services of the booking backend

pub mod availability;
pub mod bookings;
pub mod catalog;

use std::sync::Arc;

use crate::{booking::clock::Clock, config::BookingConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub availability: availability::AvailabilityService,
    pub bookings: bookings::BookingsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        booking_config: BookingConfig,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        Ok(Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            availability: availability::AvailabilityService::new(
                repository.clone(),
                booking_config.slot_interval_minutes,
            ),
            bookings: bookings::BookingsService::new(repository, &booking_config, clock)?,
        })
    }
}
