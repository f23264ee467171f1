use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{Application, ApplicationStatus, CandidateProfile};
use crate::models::evaluation::{Evaluation, Scorecard};
use crate::models::flag::{DetectedFlag, Flag};
use crate::models::job::{Job, JobChanges, NewJob};
use crate::models::message::{Message, MessageRole};

/// Record store the services persist through.
///
/// Every method is a single create, read or update; none spans rows except
/// `append_flags`, whose rows are independent facts. Implementations must
/// return messages and flags in creation order and must refuse a second
/// evaluation for the same application with `Error::Conflict`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_job(&self, job: NewJob) -> Result<Job>;
    async fn get_job(&self, id: Uuid) -> Result<Option<Job>>;
    async fn get_job_by_share_token(&self, token: &str) -> Result<Option<Job>>;
    async fn list_jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<Job>>;
    async fn update_job(&self, id: Uuid, changes: JobChanges) -> Result<Job>;

    async fn create_application(
        &self,
        job_id: Uuid,
        profile: CandidateProfile,
        status: ApplicationStatus,
    ) -> Result<Application>;
    async fn get_application(&self, id: Uuid) -> Result<Option<Application>>;
    async fn list_applications_by_job(&self, job_id: Uuid) -> Result<Vec<Application>>;
    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application>;
    /// Moves the application to `submitted` and stamps `at`, unless it is
    /// already submitted or evaluated, in which case `None` is returned and
    /// nothing changes.
    async fn mark_submitted(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Application>>;

    async fn append_message(
        &self,
        application_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<Message>;
    async fn list_messages(&self, application_id: Uuid) -> Result<Vec<Message>>;

    async fn append_flags(&self, application_id: Uuid, flags: &[DetectedFlag])
        -> Result<Vec<Flag>>;
    async fn list_flags(&self, application_id: Uuid) -> Result<Vec<Flag>>;

    async fn create_evaluation(
        &self,
        application_id: Uuid,
        scorecard: &Scorecard,
    ) -> Result<Evaluation>;
    async fn get_evaluation(&self, application_id: Uuid) -> Result<Option<Evaluation>>;
}
