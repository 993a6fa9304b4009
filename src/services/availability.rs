//! Server-side slot generation for a provider, date and service duration

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::{end_time, overlaps},
        slot::TimeSlot,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
    interval_minutes: u32,
}

impl AvailabilityService {
    pub fn new(repository: Repository, interval_minutes: u32) -> Self {
        Self {
            repository,
            interval_minutes,
        }
    }

    /// Candidate slots for a provider on a date, flagged against committed appointments
    pub async fn available_slots(
        &self,
        provider_id: i32,
        date: NaiveDate,
        service_duration: i32,
    ) -> AppResult<Vec<TimeSlot>> {
        if service_duration <= 0 {
            return Err(AppError::Validation("serviceDuration must be positive".to_string()));
        }

        let provider = self.repository.providers.get_by_id(provider_id).await?;
        if !self.repository.providers.is_working(provider_id, date).await? {
            return Ok(Vec::new());
        }

        let busy = self.repository.appointments.busy_intervals(provider_id, date).await?;
        Ok(candidate_slots(
            (provider.work_start, provider.work_end),
            self.interval_minutes,
            service_duration,
            &busy,
        ))
    }
}

/// Fixed-granularity ticks inside the working window.
///
/// A tick is emitted only when the whole service fits before the window end;
/// it is unavailable when it overlaps any busy interval.
pub fn candidate_slots(
    window: (NaiveTime, NaiveTime),
    interval_minutes: u32,
    service_duration: i32,
    busy: &[(NaiveTime, NaiveTime)],
) -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    if interval_minutes == 0 {
        return slots;
    }
    let step = Duration::minutes(interval_minutes as i64);

    let mut tick = window.0;
    while tick < window.1 {
        let Some(end) = end_time(tick, service_duration) else { break };
        if end > window.1 {
            break;
        }
        slots.push(TimeSlot {
            time: tick,
            available: !busy.iter().any(|&b| overlaps((tick, end), b)),
        });

        let (next, wrapped) = tick.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        tick = next;
    }
    slots
}
