//! In-progress booking wizard state

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::appointment::CreateBooking;

/// Fields chosen so far in one wizard session.
///
/// The serialized form is the persisted draft record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookingDraft {
    pub branch: Option<i32>,
    pub service_id: Option<i32>,
    pub service_duration: Option<i32>,
    pub service_price: Option<Decimal>,
    pub provider_id: Option<i32>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl BookingDraft {
    /// Parse a persisted draft, `None` when the record is corrupt
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(draft) => Some(draft),
            Err(e) => {
                tracing::warn!("Discarding unreadable booking draft: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build the commit request, or name the first missing field
    pub fn to_request(&self) -> Result<CreateBooking, &'static str> {
        let date = self.date.ok_or("date")?;
        let time = self.time.ok_or("time")?;
        Ok(CreateBooking {
            branch: self.branch.ok_or("branch")?,
            service_id: self.service_id.ok_or("service")?,
            service_duration: self.service_duration.ok_or("duration")?,
            service_price: self.service_price.ok_or("duration")?,
            provider_id: self.provider_id.ok_or("provider")?,
            datetime: date.and_time(time),
            name: self.name.clone().filter(|n| !n.trim().is_empty()).ok_or("name")?,
            phone: self.phone.clone().filter(|p| !p.is_empty()).ok_or("phone")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_draft() -> BookingDraft {
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

    #[test]
    fn test_parse_persisted_layout() {
        let raw = r#"{"branch":1,"serviceId":2,"serviceDuration":60,"servicePrice":"2200",
            "providerId":5,"date":"2026-10-19","time":"11:00:00","name":null,"phone":null}"#;
        let draft = BookingDraft::parse(raw).unwrap();
        assert_eq!(draft.provider_id, Some(5));
        assert_eq!(draft.time, NaiveTime::from_hms_opt(11, 0, 0));
        assert_eq!(draft.name, None);
    }

    #[test]
    fn test_parse_rejects_corrupt_records() {
        assert!(BookingDraft::parse("").is_none());
        assert!(BookingDraft::parse("{\"branch\":").is_none());
        assert!(BookingDraft::parse(r#"{"branch":1,"date":"not-a-date"}"#).is_none());
        assert!(BookingDraft::parse(r#"{"branch":"one"}"#).is_none());
        assert!(BookingDraft::parse(r#"{"branch":1,"extra":true}"#).is_none());
    }

    #[test]
    fn test_to_request_names_missing_field() {
        let mut draft = full_draft();
        assert!(draft.to_request().is_ok());

        draft.name = Some("   ".to_string());
        assert_eq!(draft.to_request().unwrap_err(), "name");

        draft.time = None;
        assert_eq!(draft.to_request().unwrap_err(), "time");
    }

    #[test]
    fn test_is_empty() {
        assert!(BookingDraft::default().is_empty());
        assert!(!full_draft().is_empty());
    }
}
