use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    InProgress,
    Submitted,
    Evaluated,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::Evaluated => "evaluated",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Once submitted or evaluated the interview no longer takes turns and
    /// cannot be submitted again.
    pub fn is_interview_closed(&self) -> bool {
        matches!(self, Self::Submitted | Self::Evaluated)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub location: Option<String>,
    pub work_authorization: Option<String>,
    pub availability: Option<String>,
    pub experience: Option<String>,
    pub compensation: Option<String>,
    pub status: ApplicationStatus,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub location: Option<String>,
    pub work_authorization: Option<String>,
    pub availability: Option<String>,
    pub experience: Option<String>,
    pub compensation: Option<String>,
}
