pub mod health;
pub mod jobs;
pub mod openapi;
pub mod public;
pub mod recruiter;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::auth::require_recruiter;
use crate::AppState;

const BODY_LIMIT_BYTES: usize = 256 * 1024;

pub fn build_router(state: AppState) -> Router {
    let base_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api/openapi.json", get(openapi::openapi_json));

    let public_api = Router::new()
        .route("/api/public/jobs/:token", get(public::get_public_job))
        .route(
            "/api/public/jobs/:token/applications",
            post(public::apply),
        )
        .route(
            "/api/public/applications/:id",
            get(public::get_transcript),
        )
        .route(
            "/api/public/applications/:id/start",
            post(public::start_interview),
        )
        .route(
            "/api/public/applications/:id/messages",
            post(public::send_message),
        )
        .route(
            "/api/public/applications/:id/submit",
            post(public::submit),
        );

    let recruiter_api = Router::new()
        .route(
            "/api/recruiter/jobs",
            get(jobs::list_jobs).post(jobs::create_job),
        )
        .route(
            "/api/recruiter/jobs/:id",
            get(jobs::get_job).patch(jobs::update_job),
        )
        .route(
            "/api/recruiter/jobs/:id/applications",
            get(jobs::list_job_applications),
        )
        .route(
            "/api/recruiter/applications/:id/report",
            get(recruiter::get_report),
        )
        .route(
            "/api/recruiter/applications/:id/status",
            post(recruiter::update_status),
        )
        .route(
            "/api/recruiter/applications/:id/evaluate",
            post(recruiter::re_evaluate),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.auth.clone(),
            require_recruiter,
        ));

    base_routes
        .merge(public_api)
        .merge(recruiter_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}
