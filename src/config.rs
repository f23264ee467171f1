use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub log_format: LogFormat,
    pub gateway: GatewayConfig,
    pub job_limits: JobLimits,
    pub interview: InterviewPolicy,
}

/// Settings for the completion service the model gateway talks to.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

/// Bounds a job's time limit and question budget must fall within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobLimits {
    pub min_time_limit: i32,
    pub max_time_limit: i32,
    pub min_questions: i32,
    pub max_questions: i32,
}

impl Default for JobLimits {
    fn default() -> Self {
        Self {
            min_time_limit: 5,
            max_time_limit: 180,
            min_questions: 1,
            max_questions: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterviewPolicy {
    /// Reject candidate turns once the question budget has been spent.
    pub enforce_question_budget: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let defaults = JobLimits::default();
        let job_limits = JobLimits {
            min_time_limit: get_env_parse_or("JOB_MIN_TIME_LIMIT", defaults.min_time_limit)?,
            max_time_limit: get_env_parse_or("JOB_MAX_TIME_LIMIT", defaults.max_time_limit)?,
            min_questions: get_env_parse_or("JOB_MIN_QUESTIONS", defaults.min_questions)?,
            max_questions: get_env_parse_or("JOB_MAX_QUESTIONS", defaults.max_questions)?,
        };
        if job_limits.min_time_limit < 1
            || job_limits.min_questions < 1
            || job_limits.min_time_limit > job_limits.max_time_limit
            || job_limits.min_questions > job_limits.max_questions
        {
            return Err(Error::Config(format!(
                "Invalid job limits: {:?}",
                job_limits
            )));
        }

        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let base_url = Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("Invalid value for OPENAI_BASE_URL: {}", e)))?;

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(other) => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {}",
                    other
                )))
            }
        };

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 20)?,
            jwt_secret: get_env("JWT_SECRET")?,
            log_format,
            gateway: GatewayConfig {
                api_key: get_env("OPENAI_API_KEY")?,
                base_url,
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                max_tokens: get_env_parse_or("OPENAI_MAX_TOKENS", 2000)?,
                timeout_secs: get_env_parse_or("OPENAI_TIMEOUT_SECS", 120)?,
            },
            job_limits,
            interview: InterviewPolicy {
                enforce_question_budget: get_env_parse_or("ENFORCE_QUESTION_BUDGET", false)?,
            },
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
