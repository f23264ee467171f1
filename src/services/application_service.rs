use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::InterviewPolicy;
use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus, CandidateProfile};
use crate::models::evaluation::Evaluation;
use crate::models::flag::Flag;
use crate::models::job::Job;
use crate::models::message::{Message, MessageRole};
use crate::services::evaluation_scorer::EvaluationScorer;
use crate::services::interview_conductor::{question_count, InterviewConductor, InterviewStage};
use crate::services::turn_guard::{TurnGuard, TurnPermit};

/// Result of one interviewer turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: Message,
    pub stage: InterviewStage,
    /// Interviewer turns in the transcript, including `reply`.
    pub question_count: usize,
    pub num_questions: usize,
    pub time_limit_minutes: i32,
    pub flags: Vec<Flag>,
}

#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub application: Application,
    pub evaluation: Option<Evaluation>,
}

#[derive(Debug, Clone)]
pub struct Transcript {
    pub application: Application,
    pub job: Job,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone)]
pub struct ApplicationReport {
    pub application: Application,
    pub job: Job,
    pub evaluation: Option<Evaluation>,
    pub flags: Vec<Flag>,
    pub messages: Vec<Message>,
}

/// Drives an application from intake through the interview to its scorecard.
#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn Store>,
    conductor: InterviewConductor,
    scorer: EvaluationScorer,
    turns: TurnGuard,
    policy: InterviewPolicy,
}

impl ApplicationService {
    pub fn new(
        store: Arc<dyn Store>,
        conductor: InterviewConductor,
        scorer: EvaluationScorer,
        policy: InterviewPolicy,
    ) -> Self {
        Self {
            store,
            conductor,
            scorer,
            turns: TurnGuard::new(),
            policy,
        }
    }

    pub async fn intake(&self, share_token: &str, profile: CandidateProfile) -> Result<Application> {
        let job = match self.store.get_job_by_share_token(share_token).await? {
            Some(job) if job.is_active => job,
            _ => return Err(Error::NotFound("Job not found".to_string())),
        };
        let app = self
            .store
            .create_application(job.id, profile, ApplicationStatus::InProgress)
            .await?;
        tracing::info!(application_id = %app.id, job_id = %job.id, "Application created");
        Ok(app)
    }

    /// Generates the interviewer's greeting for an application with an empty transcript.
    pub async fn open_interview(&self, application_id: Uuid) -> Result<TurnOutcome> {
        let _permit = self.acquire(application_id)?;
        let (app, job) = self.load(application_id).await?;
        ensure_open(&app)?;

        let history = self.store.list_messages(app.id).await?;
        if !history.is_empty() {
            return Err(Error::Conflict("Interview already started".to_string()));
        }
        self.interviewer_turn(&app, &job, history).await
    }

    /// Records the candidate's message and produces the interviewer's reply.
    pub async fn send_message(&self, application_id: Uuid, content: &str) -> Result<TurnOutcome> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::BadRequest("Message content cannot be empty".to_string()));
        }

        let _permit = self.acquire(application_id)?;
        let (app, job) = self.load(application_id).await?;
        ensure_open(&app)?;

        let mut history = self.store.list_messages(app.id).await?;
        if self.policy.enforce_question_budget
            && question_count(&history) >= job.num_questions.max(1) as usize
        {
            return Err(Error::Conflict(
                "Question budget exhausted; please submit the interview".to_string(),
            ));
        }

        let candidate = self
            .store
            .append_message(app.id, MessageRole::User, content)
            .await?;
        history.push(candidate);
        self.interviewer_turn(&app, &job, history).await
    }

    async fn interviewer_turn(
        &self,
        app: &Application,
        job: &Job,
        history: Vec<Message>,
    ) -> Result<TurnOutcome> {
        let (ctx, turn) = self.conductor.next_turn(job, &history).await;

        let reply = self
            .store
            .append_message(app.id, MessageRole::Assistant, &turn.message)
            .await?;
        let flags = if turn.flags.is_empty() {
            Vec::new()
        } else {
            self.store.append_flags(app.id, &turn.flags).await?
        };

        tracing::info!(
            application_id = %app.id,
            stage = ?turn.stage,
            question_count = ctx.question_count + 1,
            flags = flags.len(),
            "Interview turn recorded"
        );

        Ok(TurnOutcome {
            reply,
            stage: turn.stage,
            question_count: ctx.question_count + 1,
            num_questions: ctx.num_questions,
            time_limit_minutes: job.time_limit_minutes,
            flags,
        })
    }

    pub async fn transcript(&self, application_id: Uuid) -> Result<Transcript> {
        let (application, job) = self.load(application_id).await?;
        let messages = self.store.list_messages(application.id).await?;
        Ok(Transcript {
            application,
            job,
            messages,
        })
    }

    /// Closes the interview and scores it.
    ///
    /// Scoring problems never fail the submission; the application is then
    /// left `submitted` without a scorecard.
    pub async fn submit(&self, application_id: Uuid) -> Result<SubmissionOutcome> {
        let _permit = self.acquire(application_id)?;
        if self.store.get_application(application_id).await?.is_none() {
            return Err(Error::NotFound(format!(
                "Application {} not found",
                application_id
            )));
        }

        let submitted = self
            .store
            .mark_submitted(application_id, Utc::now())
            .await?
            .ok_or_else(|| Error::Conflict("Application already submitted".to_string()))?;
        tracing::info!(application_id = %submitted.id, "Application submitted");

        match self.evaluate(&submitted).await {
            Ok(Some((application, evaluation))) => Ok(SubmissionOutcome {
                application,
                evaluation: Some(evaluation),
            }),
            Ok(None) => Ok(SubmissionOutcome {
                application: submitted,
                evaluation: None,
            }),
            Err(e) => {
                tracing::error!(
                    application_id = %submitted.id,
                    error = %e,
                    "Evaluation failed; application left submitted"
                );
                Ok(SubmissionOutcome {
                    application: submitted,
                    evaluation: None,
                })
            }
        }
    }

    /// Scores a submitted application. `None` when the transcript is empty.
    ///
    /// An application that already carries a scorecard (reopened by a status
    /// override, then resubmitted) is moved back to `evaluated` without rescoring.
    async fn evaluate(&self, app: &Application) -> Result<Option<(Application, Evaluation)>> {
        if let Some(existing) = self.store.get_evaluation(app.id).await? {
            let app = self
                .store
                .set_application_status(app.id, ApplicationStatus::Evaluated)
                .await?;
            tracing::info!(
                application_id = %app.id,
                evaluation_id = %existing.id,
                "Existing evaluation reattached"
            );
            return Ok(Some((app, existing)));
        }
        let history = self.store.list_messages(app.id).await?;
        if history.is_empty() {
            return Ok(None);
        }
        let job = self.job_of(app).await?;
        let scorecard = self.scorer.score(&job, &history).await;
        let evaluation = self.store.create_evaluation(app.id, &scorecard).await?;
        let app = self
            .store
            .set_application_status(app.id, ApplicationStatus::Evaluated)
            .await?;
        tracing::info!(
            application_id = %app.id,
            overall_score = evaluation.overall_score,
            recommendation = ?evaluation.recommendation,
            "Application evaluated"
        );
        Ok(Some((app, evaluation)))
    }

    pub async fn list_for_job(&self, owner_id: Uuid, job_id: Uuid) -> Result<Vec<Application>> {
        match self.store.get_job(job_id).await? {
            Some(job) if job.owner_id == owner_id => {
                self.store.list_applications_by_job(job.id).await
            }
            _ => Err(Error::NotFound(format!("Job {} not found", job_id))),
        }
    }

    pub async fn report(&self, owner_id: Uuid, application_id: Uuid) -> Result<ApplicationReport> {
        let (application, job) = self.load_owned(owner_id, application_id).await?;
        let evaluation = self.store.get_evaluation(application.id).await?;
        let flags = self.store.list_flags(application.id).await?;
        let messages = self.store.list_messages(application.id).await?;
        Ok(ApplicationReport {
            application,
            job,
            evaluation,
            flags,
            messages,
        })
    }

    /// Recruiter disposition. Any status may be written by the owner.
    pub async fn update_status(
        &self,
        owner_id: Uuid,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let (app, _) = self.load_owned(owner_id, application_id).await?;
        let updated = self.store.set_application_status(app.id, status).await?;
        tracing::info!(
            application_id = %updated.id,
            from = %app.status,
            to = %updated.status,
            "Application status changed by recruiter"
        );
        Ok(updated)
    }

    /// Retries scoring for an application whose submission left it unscored.
    pub async fn re_evaluate(&self, owner_id: Uuid, application_id: Uuid) -> Result<Evaluation> {
        let _permit = self.acquire(application_id)?;
        let (app, _) = self.load_owned(owner_id, application_id).await?;
        if app.status != ApplicationStatus::Submitted {
            return Err(Error::Conflict(format!(
                "Only submitted applications can be re-evaluated (status is {})",
                app.status
            )));
        }
        match self.evaluate(&app).await? {
            Some((_, evaluation)) => Ok(evaluation),
            None => Err(Error::BadRequest(
                "Transcript is empty; nothing to evaluate".to_string(),
            )),
        }
    }

    fn acquire(&self, application_id: Uuid) -> Result<TurnPermit> {
        self.turns.try_acquire(application_id).ok_or_else(|| {
            tracing::warn!(application_id = %application_id, "Rejected concurrent request");
            Error::Conflict("Another request for this application is in progress".to_string())
        })
    }

    async fn load(&self, application_id: Uuid) -> Result<(Application, Job)> {
        let app = self
            .store
            .get_application(application_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", application_id)))?;
        let job = self.job_of(&app).await?;
        Ok((app, job))
    }

    async fn load_owned(&self, owner_id: Uuid, application_id: Uuid) -> Result<(Application, Job)> {
        match self.load(application_id).await {
            Ok((app, job)) if job.owner_id == owner_id => Ok((app, job)),
            Ok(_) | Err(Error::NotFound(_)) => Err(Error::NotFound(format!(
                "Application {} not found",
                application_id
            ))),
            Err(e) => Err(e),
        }
    }

    async fn job_of(&self, app: &Application) -> Result<Job> {
        self.store
            .get_job(app.job_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job {} not found", app.job_id)))
    }
}

fn ensure_open(app: &Application) -> Result<()> {
    if app.status.is_interview_closed() {
        return Err(Error::Conflict(format!(
            "Interview is closed (status is {})",
            app.status
        )));
    }
    Ok(())
}
