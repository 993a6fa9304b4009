//! Working-date override model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Explicit calendar entry for one provider and one date.
///
/// A date without an entry is not workable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WorkingDate {
    #[sqlx(rename = "work_date")]
    pub date: NaiveDate,
    pub active: bool,
}
