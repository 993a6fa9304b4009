//! Booking commit path with conflict translation and single-flight protection

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::Mutex;
use validator::Validate;

use super::{
    error::{BookingError, GatewayError},
    gateway::BookingGateway,
};
use crate::models::{Appointment, BookingDraft, CreateBooking};

static DEFAULT_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+996\d{9}$").expect("default phone pattern is valid"));

/// Accepted contact phone format: country-code prefix and fixed digit count
#[derive(Debug, Clone)]
pub struct PhonePattern(Regex);

impl PhonePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn is_match(&self, phone: &str) -> bool {
        self.0.is_match(phone)
    }
}

impl Default for PhonePattern {
    fn default() -> Self {
        Self(DEFAULT_PHONE.clone())
    }
}

/// Sole write path for appointments.
///
/// No slot is held while the customer fills in contact details; the backend
/// re-validates overlap when the booking is created.
pub struct BookingConflictGuard {
    gateway: Arc<dyn BookingGateway>,
    phone: PhonePattern,
    in_flight: Mutex<()>,
}

impl BookingConflictGuard {
    pub fn new(gateway: Arc<dyn BookingGateway>, phone: PhonePattern) -> Self {
        Self {
            gateway,
            phone,
            in_flight: Mutex::new(()),
        }
    }

    /// Check that the draft is complete and well-formed, without any network call
    pub fn validate(&self, draft: &BookingDraft) -> Result<CreateBooking, BookingError> {
        let request = draft
            .to_request()
            .map_err(|field| BookingError::validation(field, "is required"))?;

        if !self.phone.is_match(&request.phone) {
            return Err(BookingError::validation(
                "phone",
                "must include the country code, e.g. +996700111222",
            ));
        }
        request.validate().map_err(|e| {
            let field = if e.field_errors().contains_key("name") { "name" } else { "duration" };
            BookingError::validation(field, e.to_string())
        })?;
        Ok(request)
    }

    /// Create the appointment, or report why it was not created.
    ///
    /// While one commit is in flight any other call returns
    /// `BookingError::InFlight` without reaching the backend.
    pub async fn commit(&self, draft: &BookingDraft) -> Result<Appointment, BookingError> {
        let request = self.validate(draft)?;
        let _flight = self.in_flight.try_lock().map_err(|_| {
            tracing::debug!("Duplicate booking submission suppressed");
            BookingError::InFlight
        })?;

        match self.gateway.create_booking(&request).await {
            Ok(appointment) => {
                tracing::info!(
                    "Booked appointment {} with provider {} on {} at {}",
                    appointment.id,
                    appointment.provider_id,
                    appointment.date,
                    appointment.start_time
                );
                Ok(appointment)
            }
            Err(GatewayError::Conflict(msg)) => {
                tracing::info!(
                    "Slot {} with provider {} was taken before commit: {}",
                    request.datetime,
                    request.provider_id,
                    msg
                );
                Err(BookingError::Conflict)
            }
            Err(GatewayError::Rejected(msg)) => Err(BookingError::validation("booking", msg)),
            Err(e) => {
                tracing::warn!("Booking commit failed: {}", e);
                Err(BookingError::CommitFailure(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::gateway::MockBookingGateway;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn draft() -> BookingDraft {
        BookingDraft {
            branch: Some(1),
            service_id: Some(2),
            service_duration: Some(60),
            service_price: Some(Decimal::new(2200, 0)),
            provider_id: Some(5),
            date: NaiveDate::from_ymd_opt(2026, 10, 19),
            time: NaiveTime::from_hms_opt(11, 0, 0),
            name: Some("Ivan".to_string()),
            phone: Some("+996700111222".to_string()),
        }
    }

    fn appointment(request: &CreateBooking) -> Appointment {
        Appointment {
            id: 1,
            provider_id: request.provider_id,
            branch_id: request.branch,
            service_id: request.service_id,
            duration: request.service_duration,
            price: request.service_price,
            date: request.datetime.date(),
            start_time: request.datetime.time(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            name: request.name.clone(),
            phone: request.phone.clone(),
            created_at: Utc::now(),
        }
    }

    fn guard(gateway: MockBookingGateway) -> BookingConflictGuard {
        BookingConflictGuard::new(Arc::new(gateway), PhonePattern::default())
    }

    #[test]
    fn test_phone_pattern() {
        let pattern = PhonePattern::default();
        assert!(pattern.is_match("+996700111222"));
        assert!(!pattern.is_match("996700111222"));
        assert!(!pattern.is_match("+99670011122"));
        assert!(!pattern.is_match("+9967001112223"));
        assert!(!pattern.is_match("+996 700 111 222"));
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_backend() {
        let mut gateway = MockBookingGateway::new();
        gateway.expect_create_booking().never();
        let guard = guard(gateway);

        let mut bad_phone = draft();
        bad_phone.phone = Some("0700111222".to_string());
        let result = guard.commit(&bad_phone).await;
        assert!(matches!(result, Err(BookingError::Validation { field: "phone", .. })));

        let mut no_provider = draft();
        no_provider.provider_id = None;
        let result = guard.commit(&no_provider).await;
        assert!(matches!(result, Err(BookingError::Validation { field: "provider", .. })));
    }

    #[tokio::test]
    async fn test_successful_commit() {
        let mut gateway = MockBookingGateway::new();
        gateway
            .expect_create_booking()
            .withf(|r| r.provider_id == 5 && r.name == "Ivan")
            .times(1)
            .returning(|r| Ok(appointment(r)));

        let booked = guard(gateway).commit(&draft()).await.unwrap();
        assert_eq!(booked.start_time, NaiveTime::from_hms_opt(11, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_gateway_errors_are_translated() {
        let cases = [
            (GatewayError::Conflict("taken".into()), BookingError::Conflict),
            (
                GatewayError::Rejected("bad price".into()),
                BookingError::validation("booking", "bad price"),
            ),
        ];
        for (gateway_error, expected) in cases {
            let mut gateway = MockBookingGateway::new();
            gateway
                .expect_create_booking()
                .return_once(move |_| Err(gateway_error));
            assert_eq!(guard(gateway).commit(&draft()).await.unwrap_err(), expected);
        }

        let mut gateway = MockBookingGateway::new();
        gateway
            .expect_create_booking()
            .return_once(|_| Err(GatewayError::Transport("timeout".into())));
        let error = guard(gateway).commit(&draft()).await.unwrap_err();
        assert!(matches!(error, BookingError::CommitFailure(_)));
        assert!(error.is_retryable());
    }

    struct SlowGateway {
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BookingGateway for SlowGateway {
        async fn create_booking(&self, request: &CreateBooking) -> Result<Appointment, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(appointment(request))
        }
    }

    #[tokio::test]
    async fn test_duplicate_submission_is_suppressed() {
        let gateway = Arc::new(SlowGateway {
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let guard = BookingConflictGuard::new(gateway.clone(), PhonePattern::default());
        let draft = draft();

        let (first, second) = tokio::join!(guard.commit(&draft), async {
            tokio::task::yield_now().await;
            let second = guard.commit(&draft).await;
            gateway.release.notify_one();
            second
        });

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), BookingError::InFlight);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }
}
