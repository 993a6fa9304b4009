//! Business civil clock

use std::sync::Mutex;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Source of the current time in the business's fixed civil timezone
pub trait Clock: Send + Sync {
    /// Current wall-clock time at the business
    fn now(&self) -> NaiveDateTime;

    /// Current calendar date at the business
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// System clock shifted to a fixed UTC offset.
///
/// The device's own timezone never enters the computation.
#[derive(Debug, Clone, Copy)]
pub struct BusinessClock {
    offset: FixedOffset,
}

impl BusinessClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for BusinessClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

/// Manually driven clock
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        match self.now.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};

    #[test]
    fn test_business_clock_applies_offset() {
        let clock = BusinessClock::new(FixedOffset::east_opt(6 * 3600).unwrap());
        let utc = Utc::now().naive_utc();
        let diff = clock.now() - utc;
        assert!((diff - Duration::hours(6)).num_seconds().abs() < 5);
    }

    #[test]
    fn test_fixed_clock() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap().and_hms_opt(23, 59, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.today(), start.date());

        clock.set(start + Duration::minutes(2));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(clock.now().minute(), 1);
    }
}
