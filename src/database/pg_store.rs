use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::store::Store;
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus, CandidateProfile};
use crate::models::evaluation::{Evaluation, Scorecard};
use crate::models::flag::{DetectedFlag, Flag};
use crate::models::job::{Job, JobChanges, NewJob};
use crate::models::message::{Message, MessageRole};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_job(&self, job: NewJob) -> Result<Job> {
        let row = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                id, owner_id, title, description, simulation_type, seniority,
                time_limit_minutes, num_questions, scoring_weights, share_token, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job.owner_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.simulation_type)
        .bind(&job.seniority)
        .bind(job.time_limit_minutes)
        .bind(job.num_questions)
        .bind(&job.scoring_weights)
        .bind(&job.share_token)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_job_by_share_token(&self, token: &str) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, Job>(r#"SELECT * FROM jobs WHERE share_token = $1"#)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, Job>(
            r#"SELECT * FROM jobs WHERE owner_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_job(&self, id: Uuid, changes: JobChanges) -> Result<Job> {
        let row = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                simulation_type = COALESCE($4, simulation_type),
                seniority = COALESCE($5, seniority),
                time_limit_minutes = COALESCE($6, time_limit_minutes),
                num_questions = COALESCE($7, num_questions),
                scoring_weights = COALESCE($8, scoring_weights),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.simulation_type)
        .bind(changes.seniority)
        .bind(changes.time_limit_minutes)
        .bind(changes.num_questions)
        .bind(changes.scoring_weights)
        .bind(changes.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_application(
        &self,
        job_id: Uuid,
        profile: CandidateProfile,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let row = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (
                id, job_id, candidate_name, candidate_email, location, work_authorization,
                availability, experience, compensation, status, started_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job_id)
        .bind(profile.name)
        .bind(profile.email)
        .bind(profile.location)
        .bind(profile.work_authorization)
        .bind(profile.availability)
        .bind(profile.experience)
        .bind(profile.compensation)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, Application>(r#"SELECT * FROM applications WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_applications_by_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, Application>(
            r#"SELECT * FROM applications WHERE job_id = $1 ORDER BY started_at DESC"#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let row = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn mark_submitted(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = 'submitted', submitted_at = $2, updated_at = NOW()
            WHERE id = $1 AND status NOT IN ('submitted', 'evaluated')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn append_message(
        &self,
        application_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<Message> {
        let row = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, application_id, role, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(application_id)
        .bind(role)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_messages(&self, application_id: Uuid) -> Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"SELECT * FROM messages WHERE application_id = $1 ORDER BY seq ASC"#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn append_flags(
        &self,
        application_id: Uuid,
        flags: &[DetectedFlag],
    ) -> Result<Vec<Flag>> {
        let mut stored = Vec::with_capacity(flags.len());
        for flag in flags {
            let row = sqlx::query_as::<_, Flag>(
                r#"
                INSERT INTO flags (id, application_id, severity, category, excerpt)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(application_id)
            .bind(flag.severity)
            .bind(&flag.category)
            .bind(&flag.excerpt)
            .fetch_one(&self.pool)
            .await?;
            stored.push(row);
        }
        Ok(stored)
    }

    async fn list_flags(&self, application_id: Uuid) -> Result<Vec<Flag>> {
        let rows = sqlx::query_as::<_, Flag>(
            r#"SELECT * FROM flags WHERE application_id = $1 ORDER BY seq ASC"#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_evaluation(
        &self,
        application_id: Uuid,
        scorecard: &Scorecard,
    ) -> Result<Evaluation> {
        let row = sqlx::query_as::<_, Evaluation>(
            r#"
            INSERT INTO evaluations (
                id, application_id, overall_score, decision_quality, communication_clarity,
                structured_process, risk_awareness, professional_judgment, recommendation,
                summary, strengths, concerns
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(application_id)
        .bind(scorecard.overall_score)
        .bind(scorecard.decision_quality)
        .bind(scorecard.communication_clarity)
        .bind(scorecard.structured_process)
        .bind(scorecard.risk_awareness)
        .bind(scorecard.professional_judgment)
        .bind(scorecard.recommendation)
        .bind(&scorecard.summary)
        .bind(&scorecard.strengths)
        .bind(&scorecard.concerns)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict(format!(
                "Application {} already has an evaluation",
                application_id
            )),
            other => other,
        })?;
        Ok(row)
    }

    async fn get_evaluation(&self, application_id: Uuid) -> Result<Option<Evaluation>> {
        let row = sqlx::query_as::<_, Evaluation>(
            r#"SELECT * FROM evaluations WHERE application_id = $1"#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
