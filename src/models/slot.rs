//! Time slot models

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Candidate start time for a service of a given duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeSlot {
    pub time: NaiveTime,
    pub available: bool,
}

/// Query parameters for the available-slots endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotQuery {
    /// Provider ID
    pub provider: i32,
    /// Date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Requested service duration in minutes
    pub service_duration: i32,
}
