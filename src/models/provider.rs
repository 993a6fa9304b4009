//! Service provider ("master") models

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Provider as listed to booking clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: i32,
    pub name: String,
    pub specialty: Option<String>,
    pub photo_url: Option<String>,
}

/// Provider row from database, including the daily working window
#[derive(Debug, Clone, FromRow)]
pub struct ProviderRecord {
    pub id: i32,
    pub branch_id: i32,
    pub name: String,
    pub specialty: Option<String>,
    pub photo_url: Option<String>,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
}

/// Query parameters for the provider listing
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ProviderQuery {
    /// Branch ID
    pub branch: i32,
    /// Only providers offering this service
    pub service: Option<i32>,
}

impl From<ProviderRecord> for Provider {
    fn from(record: ProviderRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            specialty: record.specialty,
            photo_url: record.photo_url,
        }
    }
}
