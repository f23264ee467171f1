pub mod application;
pub mod evaluation;
pub mod flag;
pub mod job;
pub mod message;
