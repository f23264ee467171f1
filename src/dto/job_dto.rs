use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::job::{Job, ScoringWeights};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 20000, message = "Description cannot be empty"))]
    pub description: String,
    #[validate(length(min = 1, max = 64))]
    pub simulation_type: String,
    #[validate(length(min = 1, max = 64))]
    pub seniority: String,
    pub time_limit_minutes: i32,
    pub num_questions: i32,
    pub scoring_weights: Option<ScoringWeights>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 20000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub simulation_type: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub seniority: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub num_questions: Option<i32>,
    pub scoring_weights: Option<ScoringWeights>,
    pub is_active: Option<bool>,
}

/// Owner's view of a job, including the share token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub simulation_type: String,
    pub seniority: String,
    pub time_limit_minutes: i32,
    pub num_questions: i32,
    pub scoring_weights: Option<ScoringWeights>,
    pub share_token: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(j: Job) -> Self {
        let scoring_weights = j.weights();
        Self {
            id: j.id,
            title: j.title,
            description: j.description,
            simulation_type: j.simulation_type,
            seniority: j.seniority,
            time_limit_minutes: j.time_limit_minutes,
            num_questions: j.num_questions,
            scoring_weights,
            share_token: j.share_token,
            is_active: j.is_active,
            created_at: j.created_at,
            updated_at: j.updated_at,
        }
    }
}

/// What a candidate sees before applying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicJobResponse {
    pub title: String,
    pub description: String,
    pub simulation_type: String,
    pub seniority: String,
    pub time_limit_minutes: i32,
    pub num_questions: i32,
}

impl From<Job> for PublicJobResponse {
    fn from(j: Job) -> Self {
        Self {
            title: j.title,
            description: j.description,
            simulation_type: j.simulation_type,
            seniority: j.seniority,
            time_limit_minutes: j.time_limit_minutes,
            num_questions: j.num_questions,
        }
    }
}
