use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::routes::{health, jobs, public, recruiter};

#[derive(OpenApi)]
#[openapi(
    info(title = "SimHire API", description = "Job simulation interviews and scoring"),
    paths(
        health::health,
        public::get_public_job,
        public::apply,
        public::start_interview,
        public::send_message,
        public::get_transcript,
        public::submit,
        jobs::create_job,
        jobs::list_jobs,
        jobs::get_job,
        jobs::update_job,
        jobs::list_job_applications,
        recruiter::get_report,
        recruiter::update_status,
        recruiter::re_evaluate,
    )
)]
pub struct ApiDoc;

#[axum::debug_handler]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
