use std::sync::Arc;

use uuid::Uuid;

use crate::config::JobLimits;
use crate::database::Store;
use crate::dto::job_dto::{CreateJobPayload, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobChanges, NewJob, ScoringWeights};
use crate::services::evaluation_scorer::is_dimension;
use crate::utils::token::generate_share_token;

const SHARE_TOKEN_ATTEMPTS: usize = 3;
const MAX_WEIGHT: u32 = 100;

#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn Store>,
    limits: JobLimits,
}

impl JobService {
    pub fn new(store: Arc<dyn Store>, limits: JobLimits) -> Self {
        Self { store, limits }
    }

    pub async fn create(&self, owner_id: Uuid, payload: CreateJobPayload) -> Result<Job> {
        self.check_time_limit(payload.time_limit_minutes)?;
        self.check_num_questions(payload.num_questions)?;
        let scoring_weights = payload
            .scoring_weights
            .as_ref()
            .map(weights_to_json)
            .transpose()?;

        let mut last_err = None;
        for _ in 0..SHARE_TOKEN_ATTEMPTS {
            let new_job = NewJob {
                owner_id,
                title: payload.title.trim().to_string(),
                description: payload.description.trim().to_string(),
                simulation_type: payload.simulation_type.trim().to_string(),
                seniority: payload.seniority.trim().to_string(),
                time_limit_minutes: payload.time_limit_minutes,
                num_questions: payload.num_questions,
                scoring_weights: scoring_weights.clone(),
                share_token: generate_share_token(),
            };
            match self.store.create_job(new_job).await {
                Ok(job) => {
                    tracing::info!(job_id = %job.id, owner_id = %owner_id, "Job created");
                    return Ok(job);
                }
                Err(Error::Conflict(msg)) => {
                    tracing::warn!("Share token collision, retrying: {}", msg);
                    last_err = Some(Error::Conflict(msg));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| Error::Internal("Could not allocate share token".into())))
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Job>> {
        self.store.list_jobs_by_owner(owner_id).await
    }

    /// Another recruiter's job is reported as missing.
    pub async fn get_owned(&self, owner_id: Uuid, id: Uuid) -> Result<Job> {
        match self.store.get_job(id).await? {
            Some(job) if job.owner_id == owner_id => Ok(job),
            _ => Err(Error::NotFound(format!("Job {} not found", id))),
        }
    }

    pub async fn update(&self, owner_id: Uuid, id: Uuid, payload: UpdateJobPayload) -> Result<Job> {
        self.get_owned(owner_id, id).await?;
        if let Some(v) = payload.time_limit_minutes {
            self.check_time_limit(v)?;
        }
        if let Some(v) = payload.num_questions {
            self.check_num_questions(v)?;
        }
        let changes = JobChanges {
            title: payload.title.map(|s| s.trim().to_string()),
            description: payload.description.map(|s| s.trim().to_string()),
            simulation_type: payload.simulation_type.map(|s| s.trim().to_string()),
            seniority: payload.seniority.map(|s| s.trim().to_string()),
            time_limit_minutes: payload.time_limit_minutes,
            num_questions: payload.num_questions,
            scoring_weights: payload
                .scoring_weights
                .as_ref()
                .map(weights_to_json)
                .transpose()?,
            is_active: payload.is_active,
        };
        let job = self.store.update_job(id, changes).await?;
        tracing::info!(job_id = %job.id, "Job updated");
        Ok(job)
    }

    /// Candidate-facing lookup. Inactive jobs are indistinguishable from missing ones.
    pub async fn get_public(&self, share_token: &str) -> Result<Job> {
        match self.store.get_job_by_share_token(share_token).await? {
            Some(job) if job.is_active => Ok(job),
            _ => Err(Error::NotFound("Job not found".to_string())),
        }
    }

    fn check_time_limit(&self, minutes: i32) -> Result<()> {
        let (min, max) = (self.limits.min_time_limit, self.limits.max_time_limit);
        if !(min..=max).contains(&minutes) {
            return Err(Error::BadRequest(format!(
                "time_limit_minutes must be between {} and {}",
                min, max
            )));
        }
        Ok(())
    }

    fn check_num_questions(&self, n: i32) -> Result<()> {
        let (min, max) = (self.limits.min_questions, self.limits.max_questions);
        if !(min..=max).contains(&n) {
            return Err(Error::BadRequest(format!(
                "num_questions must be between {} and {}",
                min, max
            )));
        }
        Ok(())
    }
}

fn weights_to_json(weights: &ScoringWeights) -> Result<serde_json::Value> {
    if let Some(key) = weights.keys().find(|k| !is_dimension(k)) {
        return Err(Error::BadRequest(format!(
            "Unknown scoring dimension: {}",
            key
        )));
    }
    if weights.values().any(|w| *w > MAX_WEIGHT) {
        return Err(Error::BadRequest(format!(
            "Scoring weights must be between 0 and {}",
            MAX_WEIGHT
        )));
    }
    Ok(serde_json::to_value(weights)?)
}
