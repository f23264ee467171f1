pub mod application_service;
pub mod evaluation_scorer;
pub mod interview_conductor;
pub mod job_service;
pub mod model_gateway;
pub mod turn_guard;
