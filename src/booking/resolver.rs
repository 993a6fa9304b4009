//! Availability resolution: workable dates and offerable time slots

use std::{collections::BTreeSet, sync::Arc};

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::{clock::Clock, error::BookingError, gateway::AvailabilitySource};
use crate::models::{TimeSlot, WorkingDate};

/// Default length of the rolling working-date horizon
pub const DEFAULT_HORIZON_DAYS: u32 = 60;

/// Dates a provider can be booked on, within the horizon.
///
/// When the working calendar could not be read the set is empty and
/// `failure` carries the reason.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkableDates {
    dates: BTreeSet<NaiveDate>,
    failure: Option<String>,
}

impl WorkableDates {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn dates(&self) -> &BTreeSet<NaiveDate> {
        &self.dates
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    fn failed(reason: String) -> Self {
        Self {
            dates: BTreeSet::new(),
            failure: Some(reason),
        }
    }
}

pub struct AvailabilityResolver {
    source: Arc<dyn AvailabilitySource>,
    clock: Arc<dyn Clock>,
    horizon_days: u32,
}

impl AvailabilityResolver {
    pub fn new(source: Arc<dyn AvailabilitySource>, clock: Arc<dyn Clock>, horizon_days: u32) -> Self {
        Self {
            source,
            clock,
            horizon_days,
        }
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    /// Workable dates in `[today, today + horizon)`; empty if the calendar cannot be read
    pub async fn resolve_workable_dates(&self, provider_id: i32) -> WorkableDates {
        let today = self.clock.today();
        match self.source.working_dates(provider_id).await {
            Ok(entries) => WorkableDates {
                dates: workable_in_horizon(&entries, today, self.horizon_days),
                failure: None,
            },
            Err(e) => {
                tracing::warn!(
                    "Working dates for provider {} unavailable, offering no dates: {}",
                    provider_id,
                    e
                );
                WorkableDates::failed(e.to_string())
            }
        }
    }

    /// Offerable slots for a workable date, ascending by time.
    ///
    /// `NoAvailability` when nothing is left after filtering,
    /// `SourceUnavailable` when the slots could not be read.
    pub async fn resolve_time_slots(
        &self,
        provider_id: i32,
        date: NaiveDate,
        service_duration: i32,
    ) -> Result<Vec<TimeSlot>, BookingError> {
        if service_duration <= 0 {
            return Err(BookingError::validation("duration", "must be positive"));
        }

        let now = self.clock.now();
        if !in_horizon(date, now.date(), self.horizon_days) {
            return Err(BookingError::NoAvailability);
        }

        let raw = self
            .source
            .available_slots(provider_id, date, service_duration)
            .await
            .map_err(|e| {
                tracing::warn!(
                    "Slots for provider {} on {} unavailable: {}",
                    provider_id,
                    date,
                    e
                );
                BookingError::SourceUnavailable(e.to_string())
            })?;

        let slots = offerable_slots(raw, date, now);
        if slots.is_empty() {
            tracing::debug!("No availability for provider {} on {}", provider_id, date);
            return Err(BookingError::NoAvailability);
        }
        Ok(slots)
    }
}

fn in_horizon(date: NaiveDate, today: NaiveDate, horizon_days: u32) -> bool {
    date >= today && date < today + Duration::days(horizon_days as i64)
}

/// Dates with an active override inside the horizon.
///
/// A date listed more than once is workable only if every entry is active.
pub fn workable_in_horizon(entries: &[WorkingDate], today: NaiveDate, horizon_days: u32) -> BTreeSet<NaiveDate> {
    let inactive: BTreeSet<NaiveDate> = entries.iter().filter(|e| !e.active).map(|e| e.date).collect();
    entries
        .iter()
        .filter(|e| e.active && !inactive.contains(&e.date))
        .map(|e| e.date)
        .filter(|&d| in_horizon(d, today, horizon_days))
        .collect()
}

/// Keep available slots that have not elapsed, sorted and de-duplicated
pub fn offerable_slots(raw: Vec<TimeSlot>, date: NaiveDate, now: NaiveDateTime) -> Vec<TimeSlot> {
    let mut slots: Vec<TimeSlot> = raw.into_iter().filter(|s| s.available).collect();
    apply_same_day_cutoff(&mut slots, date, now);
    slots.sort_by_key(|s| s.time);
    slots.dedup_by_key(|s| s.time);
    slots
}

/// On the current business date, drop every slot not strictly after `now`
pub fn apply_same_day_cutoff(slots: &mut Vec<TimeSlot>, date: NaiveDate, now: NaiveDateTime) {
    if date == now.date() {
        slots.retain(|s| s.time > now.time());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{clock::FixedClock, error::GatewayError, gateway::MockAvailabilitySource};
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn slot(h: u32, m: u32) -> TimeSlot {
        TimeSlot { time: t(h, m), available: true }
    }

    fn resolver(source: MockAvailabilitySource, now: NaiveTime) -> AvailabilityResolver {
        AvailabilityResolver::new(
            Arc::new(source),
            Arc::new(FixedClock::new(today().and_time(now))),
            DEFAULT_HORIZON_DAYS,
        )
    }

    #[test]
    fn test_horizon_bounds() {
        let entries: Vec<WorkingDate> = [-1i64, 0, 1, 59, 60, 75]
            .iter()
            .map(|&d| WorkingDate { date: today() + Duration::days(d), active: true })
            .collect();
        let dates = workable_in_horizon(&entries, today(), 60);
        let expected: BTreeSet<_> = [0i64, 1, 59].iter().map(|&d| today() + Duration::days(d)).collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn test_inactive_and_missing_dates_are_not_workable() {
        let tomorrow = today() + Duration::days(1);
        let entries = vec![
            WorkingDate { date: today(), active: false },
            WorkingDate { date: tomorrow, active: true },
            WorkingDate { date: tomorrow, active: false },
        ];
        assert!(workable_in_horizon(&entries, today(), 60).is_empty());
        assert!(workable_in_horizon(&[], today(), 60).is_empty());
    }

    #[test]
    fn test_same_day_cutoff_is_strict() {
        let now = today().and_time(t(10, 30));
        let raw = vec![slot(10, 0), slot(10, 30), slot(11, 0), slot(14, 0)];
        let times: Vec<_> = offerable_slots(raw, today(), now).iter().map(|s| s.time).collect();
        assert_eq!(times, vec![t(11, 0), t(14, 0)]);
    }

    #[test]
    fn test_cutoff_ignores_other_dates() {
        let now = today().and_time(t(23, 0));
        let raw = vec![slot(9, 0), slot(10, 30)];
        let tomorrow = today() + Duration::days(1);
        assert_eq!(offerable_slots(raw, tomorrow, now).len(), 2);
    }

    #[test]
    fn test_offerable_slots_sorted_and_available_only() {
        let now = today().and_time(t(8, 0));
        let raw = vec![
            slot(14, 0),
            TimeSlot { time: t(12, 0), available: false },
            slot(11, 0),
            slot(11, 0),
        ];
        let times: Vec<_> = offerable_slots(raw, today(), now).iter().map(|s| s.time).collect();
        assert_eq!(times, vec![t(11, 0), t(14, 0)]);
    }

    #[tokio::test]
    async fn test_workable_dates_fail_closed() {
        let mut source = MockAvailabilitySource::new();
        source
            .expect_working_dates()
            .returning(|_| Err(GatewayError::Transport("connection refused".into())));

        let dates = resolver(source, t(9, 0)).resolve_workable_dates(7).await;
        assert!(dates.is_empty());
        assert!(dates.failure().is_some());
    }

    #[tokio::test]
    async fn test_resolve_time_slots_applies_cutoff() {
        let mut source = MockAvailabilitySource::new();
        source
            .expect_available_slots()
            .withf(|provider, _, duration| *provider == 7 && *duration == 60)
            .times(1)
            .returning(|_, _, _| Ok(vec![slot(10, 0), slot(10, 30), slot(11, 0), slot(14, 0)]));

        let slots = resolver(source, t(10, 30)).resolve_time_slots(7, today(), 60).await.unwrap();
        let times: Vec<_> = slots.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![t(11, 0), t(14, 0)]);
    }

    #[tokio::test]
    async fn test_everything_elapsed_is_no_availability() {
        let mut source = MockAvailabilitySource::new();
        source
            .expect_available_slots()
            .returning(|_, _, _| Ok(vec![slot(10, 0), slot(10, 30)]));

        let result = resolver(source, t(18, 0)).resolve_time_slots(7, today(), 60).await;
        assert_eq!(result, Err(BookingError::NoAvailability));
    }

    #[tokio::test]
    async fn test_slot_source_failure_is_source_unavailable() {
        let mut source = MockAvailabilitySource::new();
        source
            .expect_available_slots()
            .returning(|_, _, _| Err(GatewayError::Status { status: 502, message: "bad gateway".into() }));

        let result = resolver(source, t(9, 0)).resolve_time_slots(7, today(), 60).await;
        assert!(matches!(result, Err(BookingError::SourceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_past_dates_never_queried() {
        let mut source = MockAvailabilitySource::new();
        source.expect_available_slots().never();

        let yesterday = today() - Duration::days(1);
        let result = resolver(source, t(9, 0)).resolve_time_slots(7, yesterday, 60).await;
        assert_eq!(result, Err(BookingError::NoAvailability));
    }
}
