use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        application_dto::ApplicationResponse,
        job_dto::{CreateJobPayload, JobResponse, UpdateJobPayload},
    },
    error::Result,
    middleware::auth::RecruiterId,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/recruiter/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created", body = JobResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(RecruiterId(owner_id)): Extension<RecruiterId>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create(owner_id, payload).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    get,
    path = "/api/recruiter/jobs",
    responses(
        (status = 200, description = "Jobs owned by the caller", body = [JobResponse]),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(RecruiterId(owner_id)): Extension<RecruiterId>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list(owner_id).await?;
    let items: Vec<JobResponse> = jobs.into_iter().map(JobResponse::from).collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/recruiter/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job details", body = JobResponse),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Extension(RecruiterId(owner_id)): Extension<RecruiterId>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_owned(owner_id, id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    patch,
    path = "/api/recruiter/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = JobResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(RecruiterId(owner_id)): Extension<RecruiterId>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.update(owner_id, id, payload).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    get,
    path = "/api/recruiter/jobs/{id}/applications",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Applications for the job", body = [ApplicationResponse]),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn list_job_applications(
    State(state): State<AppState>,
    Extension(RecruiterId(owner_id)): Extension<RecruiterId>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let apps = state.application_service.list_for_job(owner_id, id).await?;
    let items: Vec<ApplicationResponse> = apps.into_iter().map(ApplicationResponse::from).collect();
    Ok(Json(items))
}
