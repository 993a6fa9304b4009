//! Service catalog models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A bookable offering with one or more duration/price variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Default duration in minutes
    pub default_duration: i32,
    /// Duration/price variants, in display order
    #[serde(default)]
    pub available_durations: Vec<DurationOption>,
}

/// One (duration, price) variant of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DurationOption {
    /// Duration in minutes
    pub duration: i32,
    pub price: Decimal,
}

/// Service row from database
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub default_duration: i32,
}

/// Duration option row from database
#[derive(Debug, Clone, FromRow)]
pub struct DurationRow {
    pub service_id: i32,
    pub duration: i32,
    pub price: Decimal,
}

impl Service {
    /// Find the variant with the given duration
    pub fn option_for(&self, duration: i32) -> Option<&DurationOption> {
        self.available_durations.iter().find(|o| o.duration == duration)
    }

    /// The only variant, when the service has exactly one
    pub fn single_option(&self) -> Option<&DurationOption> {
        match self.available_durations.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Whether `(duration, price)` is one of this service's variants
    pub fn offers(&self, duration: i32, price: Decimal) -> bool {
        self.option_for(duration).is_some_and(|o| o.price == price)
    }
}
