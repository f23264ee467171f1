use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::store::Store;
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus, CandidateProfile};
use crate::models::evaluation::{Evaluation, Scorecard};
use crate::models::flag::{DetectedFlag, Flag};
use crate::models::job::{Job, JobChanges, NewJob};
use crate::models::message::{Message, MessageRole};

#[derive(Default)]
struct Tables {
    jobs: HashMap<Uuid, Job>,
    applications: HashMap<Uuid, Application>,
    messages: Vec<Message>,
    flags: Vec<Flag>,
    evaluations: HashMap<Uuid, Evaluation>,
    next_seq: i64,
}

impl Tables {
    fn seq(&mut self) -> i64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn require_application(&self, id: Uuid) -> Result<()> {
        if self.applications.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::NotFound(format!("Application {} not found", id)))
        }
    }
}

/// Process-local store backing the test suites.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_job(&self, job: NewJob) -> Result<Job> {
        let mut t = self.lock();
        if t.jobs.values().any(|j| j.share_token == job.share_token) {
            return Err(Error::Conflict("Share token already in use".to_string()));
        }
        let now = Utc::now();
        let row = Job {
            id: Uuid::new_v4(),
            owner_id: job.owner_id,
            title: job.title,
            description: job.description,
            simulation_type: job.simulation_type,
            seniority: job.seniority,
            time_limit_minutes: job.time_limit_minutes,
            num_questions: job.num_questions,
            scoring_weights: job.scoring_weights,
            share_token: job.share_token,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.jobs.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(self.lock().jobs.get(&id).cloned())
    }

    async fn get_job_by_share_token(&self, token: &str) -> Result<Option<Job>> {
        Ok(self
            .lock()
            .jobs
            .values()
            .find(|j| j.share_token == token)
            .cloned())
    }

    async fn list_jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>> {
        let mut rows: Vec<Job> = self
            .lock()
            .jobs
            .values()
            .filter(|j| j.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_job(&self, id: Uuid, changes: JobChanges) -> Result<Job> {
        let mut t = self.lock();
        let job = t
            .jobs
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Job {} not found", id)))?;
        if let Some(v) = changes.title {
            job.title = v;
        }
        if let Some(v) = changes.description {
            job.description = v;
        }
        if let Some(v) = changes.simulation_type {
            job.simulation_type = v;
        }
        if let Some(v) = changes.seniority {
            job.seniority = v;
        }
        if let Some(v) = changes.time_limit_minutes {
            job.time_limit_minutes = v;
        }
        if let Some(v) = changes.num_questions {
            job.num_questions = v;
        }
        if let Some(v) = changes.scoring_weights {
            job.scoring_weights = Some(v);
        }
        if let Some(v) = changes.is_active {
            job.is_active = v;
        }
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    async fn create_application(
        &self,
        job_id: Uuid,
        profile: CandidateProfile,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let mut t = self.lock();
        if !t.jobs.contains_key(&job_id) {
            return Err(Error::NotFound(format!("Job {} not found", job_id)));
        }
        let now = Utc::now();
        let row = Application {
            id: Uuid::new_v4(),
            job_id,
            candidate_name: profile.name,
            candidate_email: profile.email,
            location: profile.location,
            work_authorization: profile.work_authorization,
            availability: profile.availability,
            experience: profile.experience,
            compensation: profile.compensation,
            status,
            started_at: now,
            submitted_at: None,
            updated_at: now,
        };
        t.applications.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
        Ok(self.lock().applications.get(&id).cloned())
    }

    async fn list_applications_by_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let mut rows: Vec<Application> = self
            .lock()
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(rows)
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let mut t = self.lock();
        let app = t
            .applications
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;
        app.status = status;
        app.updated_at = Utc::now();
        Ok(app.clone())
    }

    async fn mark_submitted(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Application>> {
        let mut t = self.lock();
        let app = t
            .applications
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;
        if app.status.is_interview_closed() {
            return Ok(None);
        }
        app.status = ApplicationStatus::Submitted;
        app.submitted_at = Some(at);
        app.updated_at = Utc::now();
        Ok(Some(app.clone()))
    }

    async fn append_message(
        &self,
        application_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<Message> {
        let mut t = self.lock();
        t.require_application(application_id)?;
        let seq = t.seq();
        let row = Message {
            id: Uuid::new_v4(),
            application_id,
            seq,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        t.messages.push(row.clone());
        Ok(row)
    }

    async fn list_messages(&self, application_id: Uuid) -> Result<Vec<Message>> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.application_id == application_id)
            .cloned()
            .collect())
    }

    async fn append_flags(
        &self,
        application_id: Uuid,
        flags: &[DetectedFlag],
    ) -> Result<Vec<Flag>> {
        let mut t = self.lock();
        t.require_application(application_id)?;
        let mut stored = Vec::with_capacity(flags.len());
        for flag in flags {
            let seq = t.seq();
            let row = Flag {
                id: Uuid::new_v4(),
                application_id,
                seq,
                severity: flag.severity,
                category: flag.category.clone(),
                excerpt: flag.excerpt.clone(),
                created_at: Utc::now(),
            };
            t.flags.push(row.clone());
            stored.push(row);
        }
        Ok(stored)
    }

    async fn list_flags(&self, application_id: Uuid) -> Result<Vec<Flag>> {
        Ok(self
            .lock()
            .flags
            .iter()
            .filter(|f| f.application_id == application_id)
            .cloned()
            .collect())
    }

    async fn create_evaluation(
        &self,
        application_id: Uuid,
        scorecard: &Scorecard,
    ) -> Result<Evaluation> {
        let mut t = self.lock();
        t.require_application(application_id)?;
        if t.evaluations.contains_key(&application_id) {
            return Err(Error::Conflict(format!(
                "Application {} already has an evaluation",
                application_id
            )));
        }
        let row = Evaluation {
            id: Uuid::new_v4(),
            application_id,
            overall_score: scorecard.overall_score,
            decision_quality: scorecard.decision_quality,
            communication_clarity: scorecard.communication_clarity,
            structured_process: scorecard.structured_process,
            risk_awareness: scorecard.risk_awareness,
            professional_judgment: scorecard.professional_judgment,
            recommendation: scorecard.recommendation,
            summary: scorecard.summary.clone(),
            strengths: scorecard.strengths.clone(),
            concerns: scorecard.concerns.clone(),
            created_at: Utc::now(),
        };
        t.evaluations.insert(application_id, row.clone());
        Ok(row)
    }

    async fn get_evaluation(&self, application_id: Uuid) -> Result<Option<Evaluation>> {
        Ok(self.lock().evaluations.get(&application_id).cloned())
    }
}
