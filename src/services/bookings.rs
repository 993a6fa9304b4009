//! Booking service: validates booking requests and commits appointments

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use regex::Regex;
use validator::Validate;

use crate::{
    booking::clock::Clock,
    config::BookingConfig,
    error::{AppError, AppResult},
    models::appointment::{end_time, Appointment, CreateBooking, NewAppointment},
    repository::Repository,
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    phone_pattern: Regex,
    horizon_days: u32,
}

impl BookingsService {
    pub fn new(repository: Repository, config: &BookingConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let phone_pattern = Regex::new(&config.phone_pattern)
            .map_err(|e| AppError::Internal(format!("Invalid phone pattern: {}", e)))?;
        Ok(Self {
            repository,
            clock,
            phone_pattern,
            horizon_days: config.horizon_days,
        })
    }

    /// Validate and atomically create an appointment
    pub async fn create(&self, request: CreateBooking) -> AppResult<Appointment> {
        request.validate()?;
        if !self.phone_pattern.is_match(&request.phone) {
            return Err(AppError::Validation("Invalid phone number".to_string()));
        }

        let service = self.repository.catalog.get_service(request.service_id).await?;
        if !service.offers(request.service_duration, request.service_price) {
            return Err(AppError::Validation(format!(
                "Service {} has no {} minute option at price {}",
                service.id, request.service_duration, request.service_price
            )));
        }

        let provider = self.repository.providers.get_by_id(request.provider_id).await?;
        if provider.branch_id != request.branch {
            return Err(AppError::Validation(format!(
                "Provider {} does not work at branch {}",
                provider.id, request.branch
            )));
        }
        if !self.repository.providers.offers_service(provider.id, service.id).await? {
            return Err(AppError::Validation(format!(
                "Provider {} does not perform service {}",
                provider.id, service.id
            )));
        }

        let date = request.datetime.date();
        if !self.repository.providers.is_working(provider.id, date).await? {
            return Err(AppError::Validation(format!(
                "Provider {} does not work on {}",
                provider.id, date
            )));
        }

        let end = check_schedule(
            request.datetime,
            request.service_duration,
            (provider.work_start, provider.work_end),
            self.clock.now(),
            self.horizon_days,
        )?;

        let new = NewAppointment {
            provider_id: provider.id,
            branch_id: request.branch,
            service_id: service.id,
            duration: request.service_duration,
            price: request.service_price,
            date,
            start_time: request.datetime.time(),
            end_time: end,
            name: request.name.trim().to_string(),
            phone: request.phone,
        };

        match self.repository.appointments.create(&new).await {
            Ok(appointment) => {
                tracing::info!(
                    "Appointment {} booked: provider {} on {} {}-{}",
                    appointment.id,
                    appointment.provider_id,
                    appointment.date,
                    appointment.start_time,
                    appointment.end_time
                );
                Ok(appointment)
            }
            Err(AppError::Conflict(msg)) => {
                tracing::info!("Booking conflict: {}", msg);
                Err(AppError::Conflict(msg))
            }
            Err(e) => Err(e),
        }
    }
}

/// Time rules of a booking, returning the appointment end time.
///
/// The date must fall inside `[today, today + horizon_days)`, the start must
/// not have elapsed in business time, and the appointment must fit inside the
/// working window without crossing midnight.
pub fn check_schedule(
    start: NaiveDateTime,
    duration: i32,
    window: (NaiveTime, NaiveTime),
    now: NaiveDateTime,
    horizon_days: u32,
) -> AppResult<NaiveTime> {
    let today = now.date();
    let date = start.date();
    if date < today || date >= today + Duration::days(horizon_days as i64) {
        return Err(AppError::Validation(format!("{} is outside the booking horizon", date)));
    }
    if date == today && start.time() <= now.time() {
        return Err(AppError::Validation(format!("{} has already passed", start)));
    }

    let end = end_time(start.time(), duration)
        .ok_or_else(|| AppError::Validation("Appointment must end on the same day".to_string()))?;
    if start.time() < window.0 || end > window.1 {
        return Err(AppError::Validation(format!(
            "{}-{} is outside working hours {}-{}",
            start.time(),
            end,
            window.0,
            window.1
        )));
    }
    Ok(end)
}
