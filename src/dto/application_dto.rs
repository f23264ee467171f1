use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::job_dto::{JobResponse, PublicJobResponse};
use crate::models::application::{Application, ApplicationStatus, CandidateProfile};
use crate::models::evaluation::{Evaluation, Recommendation};
use crate::models::flag::Flag;
use crate::models::message::{Message, MessageRole};
use crate::services::application_service::{
    ApplicationReport, SubmissionOutcome, Transcript, TurnOutcome,
};
use crate::services::interview_conductor::InterviewStage;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IntakePayload {
    #[validate(length(min = 1, max = 200, message = "Candidate name cannot be empty"))]
    pub candidate_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub candidate_email: String,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(length(max = 200))]
    pub work_authorization: Option<String>,
    #[validate(length(max = 200))]
    pub availability: Option<String>,
    #[validate(length(max = 4000))]
    pub experience: Option<String>,
    #[validate(length(max = 200))]
    pub compensation: Option<String>,
}

impl From<IntakePayload> for CandidateProfile {
    fn from(p: IntakePayload) -> Self {
        fn blank_to_none(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            name: p.candidate_name.trim().to_string(),
            email: p.candidate_email.trim().to_string(),
            location: blank_to_none(p.location),
            work_authorization: blank_to_none(p.work_authorization),
            availability: blank_to_none(p.availability),
            experience: blank_to_none(p.experience),
            compensation: blank_to_none(p.compensation),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessagePayload {
    #[validate(length(min = 1, max = 8000, message = "Message content cannot be empty"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
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
}

impl From<Application> for ApplicationResponse {
    fn from(a: Application) -> Self {
        Self {
            id: a.id,
            job_id: a.job_id,
            candidate_name: a.candidate_name,
            candidate_email: a.candidate_email,
            location: a.location,
            work_authorization: a.work_authorization,
            availability: a.availability,
            experience: a.experience,
            compensation: a.compensation,
            status: a.status,
            started_at: a.started_at,
            submitted_at: a.submitted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            role: m.role,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

/// Returned to the candidate after each turn. Flags stay recruiter-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub reply: MessageResponse,
    pub stage: InterviewStage,
    pub question_count: usize,
    pub num_questions: usize,
    pub time_limit_minutes: i32,
}

impl From<TurnOutcome> for TurnResponse {
    fn from(t: TurnOutcome) -> Self {
        Self {
            reply: t.reply.into(),
            stage: t.stage,
            question_count: t.question_count,
            num_questions: t.num_questions,
            time_limit_minutes: t.time_limit_minutes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub application_id: Uuid,
    pub status: ApplicationStatus,
    pub job: PublicJobResponse,
    pub messages: Vec<MessageResponse>,
}

impl From<Transcript> for TranscriptResponse {
    fn from(t: Transcript) -> Self {
        Self {
            application_id: t.application.id,
            status: t.application.status,
            job: t.job.into(),
            messages: t.messages.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub application_id: Uuid,
    pub status: ApplicationStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub message: String,
}

impl From<SubmissionOutcome> for SubmitResponse {
    fn from(s: SubmissionOutcome) -> Self {
        Self {
            application_id: s.application.id,
            status: s.application.status,
            submitted_at: s.application.submitted_at,
            message: "Thank you. Your interview has been submitted.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResponse {
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

impl From<Evaluation> for EvaluationResponse {
    fn from(e: Evaluation) -> Self {
        Self {
            id: e.id,
            application_id: e.application_id,
            overall_score: e.overall_score,
            decision_quality: e.decision_quality,
            communication_clarity: e.communication_clarity,
            structured_process: e.structured_process,
            risk_awareness: e.risk_awareness,
            professional_judgment: e.professional_judgment,
            recommendation: e.recommendation,
            summary: e.summary,
            strengths: e.strengths,
            concerns: e.concerns,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub application: ApplicationResponse,
    pub job: JobResponse,
    pub evaluation: Option<EvaluationResponse>,
    pub flags: Vec<Flag>,
    pub messages: Vec<MessageResponse>,
}

impl From<ApplicationReport> for ReportResponse {
    fn from(r: ApplicationReport) -> Self {
        Self {
            application: r.application.into(),
            job: r.job.into(),
            evaluation: r.evaluation.map(Into::into),
            flags: r.flags,
            messages: r.messages.into_iter().map(Into::into).collect(),
        }
    }
}
