pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::{Config, InterviewPolicy, JobLimits};
use crate::database::Store;
use crate::middleware::auth::AuthKeys;
use crate::services::{
    application_service::ApplicationService, evaluation_scorer::EvaluationScorer,
    interview_conductor::InterviewConductor, job_service::JobService,
    model_gateway::ModelGateway,
};

/// The parts of [`Config`] request handling depends on.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub jwt_secret: String,
    pub job_limits: JobLimits,
    pub interview: InterviewPolicy,
}

impl From<&Config> for AppSettings {
    fn from(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            job_limits: config.job_limits,
            interview: config.interview,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub auth: AuthKeys,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, gateway: Arc<dyn ModelGateway>, settings: AppSettings) -> Self {
        let job_service = JobService::new(store.clone(), settings.job_limits);
        let application_service = ApplicationService::new(
            store,
            InterviewConductor::new(gateway.clone()),
            EvaluationScorer::new(gateway),
            settings.interview,
        );

        Self {
            job_service,
            application_service,
            auth: AuthKeys::new(&settings.jwt_secret),
        }
    }
}
