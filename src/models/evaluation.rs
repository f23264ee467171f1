use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "recommendation", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongHire,
    Hire,
    Maybe,
    NoHire,
    StrongNoHire,
}

impl Recommendation {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "strong_hire" => Some(Self::StrongHire),
            "hire" => Some(Self::Hire),
            "maybe" => Some(Self::Maybe),
            "no_hire" => Some(Self::NoHire),
            "strong_no_hire" => Some(Self::StrongNoHire),
            _ => None,
        }
    }
}

/// A normalized scorecard: every score is an integer in `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scorecard {
    pub overall_score: i32,
    pub decision_quality: i32,
    pub communication_clarity: i32,
    pub structured_process: i32,
    pub risk_awareness: i32,
    pub professional_judgment: i32,
    pub recommendation: Recommendation,
    pub summary: String,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Evaluation {
    pub id: Uuid,
    pub application_id: Uuid,
    pub overall_score: i32,
    pub decision_quality: i32,
    pub communication_clarity: i32,
    pub structured_process: i32,
    pub risk_awareness: i32,
    pub professional_judgment: i32,
    pub recommendation: Recommendation,
    pub summary: String,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub created_at: DateTime<Utc>,
}
