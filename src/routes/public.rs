use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        application_dto::{
            ApplicationResponse, IntakePayload, SendMessagePayload, SubmitResponse,
            TranscriptResponse, TurnResponse,
        },
        job_dto::PublicJobResponse,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/public/jobs/{token}",
    params(("token" = String, Path, description = "Job share token")),
    responses(
        (status = 200, description = "Job details for candidates", body = PublicJobResponse),
        (status = 404, description = "Unknown or inactive job")
    )
)]
#[axum::debug_handler]
pub async fn get_public_job(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_public(&token).await?;
    Ok(Json(PublicJobResponse::from(job)))
}

#[utoipa::path(
    post,
    path = "/api/public/jobs/{token}/applications",
    params(("token" = String, Path, description = "Job share token")),
    request_body = IntakePayload,
    responses(
        (status = 201, description = "Application created", body = ApplicationResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Unknown or inactive job")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<IntakePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let app = state
        .application_service
        .intake(&token, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApplicationResponse::from(app))))
}

#[utoipa::path(
    post,
    path = "/api/public/applications/{id}/start",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Interviewer greeting", body = TurnResponse),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Interview already started or closed")
    )
)]
#[axum::debug_handler]
pub async fn start_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let outcome = state.application_service.open_interview(id).await?;
    Ok(Json(TurnResponse::from(outcome)))
}

#[utoipa::path(
    post,
    path = "/api/public/applications/{id}/messages",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = SendMessagePayload,
    responses(
        (status = 200, description = "Interviewer reply", body = TurnResponse),
        (status = 400, description = "Empty message"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Interview closed or another turn in progress")
    )
)]
#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .application_service
        .send_message(id, &payload.content)
        .await?;
    Ok(Json(TurnResponse::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/public/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Interview transcript", body = TranscriptResponse),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let transcript = state.application_service.transcript(id).await?;
    Ok(Json(TranscriptResponse::from(transcript)))
}

#[utoipa::path(
    post,
    path = "/api/public/applications/{id}/submit",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Interview submitted", body = SubmitResponse),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Already submitted")
    )
)]
#[axum::debug_handler]
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let outcome = state.application_service.submit(id).await?;
    Ok(Json(SubmitResponse::from(outcome)))
}
