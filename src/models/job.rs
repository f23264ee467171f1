use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Relative weight per scoring dimension, keyed by dimension name.
pub type ScoringWeights = BTreeMap<String, u32>;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub simulation_type: String,
    pub seniority: String,
    pub time_limit_minutes: i32,
    pub num_questions: i32,
    pub scoring_weights: Option<JsonValue>,
    pub share_token: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn weights(&self) -> Option<ScoringWeights> {
        self.scoring_weights
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub simulation_type: String,
    pub seniority: String,
    pub time_limit_minutes: i32,
    pub num_questions: i32,
    pub scoring_weights: Option<JsonValue>,
    pub share_token: String,
}

/// Partial update; `None` leaves the column untouched. The share token is not editable.
#[derive(Debug, Clone, Default)]
pub struct JobChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub simulation_type: Option<String>,
    pub seniority: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub num_questions: Option<i32>,
    pub scoring_weights: Option<JsonValue>,
    pub is_active: Option<bool>,
}
