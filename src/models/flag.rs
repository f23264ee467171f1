use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "flag_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FlagSeverity {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Flag {
    pub id: Uuid,
    pub application_id: Uuid,
    pub seq: i64,
    pub severity: FlagSeverity,
    pub category: String,
    pub excerpt: String,
    pub created_at: DateTime<Utc>,
}

/// A behavioral observation produced by one interview turn, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedFlag {
    pub severity: FlagSeverity,
    pub category: String,
    pub excerpt: String,
}
