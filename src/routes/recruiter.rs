use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::application_dto::{
        ApplicationResponse, EvaluationResponse, ReportResponse, UpdateStatusPayload,
    },
    error::Result,
    middleware::auth::RecruiterId,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/recruiter/applications/{id}/report",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Scorecard, flags and transcript", body = ReportResponse),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_report(
    State(state): State<AppState>,
    Extension(RecruiterId(owner_id)): Extension<RecruiterId>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let report = state.application_service.report(owner_id, id).await?;
    Ok(Json(ReportResponse::from(report)))
}

#[utoipa::path(
    post,
    path = "/api/recruiter/applications/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status updated", body = ApplicationResponse),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(RecruiterId(owner_id)): Extension<RecruiterId>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    let app = state
        .application_service
        .update_status(owner_id, id, payload.status)
        .await?;
    Ok(Json(ApplicationResponse::from(app)))
}

#[utoipa::path(
    post,
    path = "/api/recruiter/applications/{id}/evaluate",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 201, description = "Evaluation created", body = EvaluationResponse),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Not submitted or already evaluated")
    )
)]
#[axum::debug_handler]
pub async fn re_evaluate(
    State(state): State<AppState>,
    Extension(RecruiterId(owner_id)): Extension<RecruiterId>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let evaluation = state.application_service.re_evaluate(owner_id, id).await?;
    Ok((StatusCode::CREATED, Json(EvaluationResponse::from(evaluation))))
}
