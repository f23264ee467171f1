use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::models::evaluation::{Recommendation, Scorecard};
use crate::models::job::Job;
use crate::models::message::{Message, MessageRole};
use crate::services::model_gateway::{ChatTurn, CompletionRequest, ModelGateway};

/// Scoring dimensions, in the order they are reported.
pub const DIMENSIONS: [(&str, &str); 5] = [
    ("decision_quality", "decisionQuality"),
    ("communication_clarity", "communicationClarity"),
    ("structured_process", "structuredProcess"),
    ("risk_awareness", "riskAwareness"),
    ("professional_judgment", "professionalJudgment"),
];

pub const DEFAULT_SUMMARY: &str = "Evaluation completed.";
pub const FALLBACK_SUMMARY: &str = "Automated evaluation could not be completed. \
A manual review of the transcript is recommended.";
const FALLBACK_SCORE: i32 = 50;

pub fn is_dimension(key: &str) -> bool {
    DIMENSIONS.iter().any(|(snake, _)| *snake == key)
}

pub fn render_transcript(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| {
            let speaker = match m.role {
                MessageRole::Assistant => "Interviewer",
                MessageRole::User => "Candidate",
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_system_prompt(job: &Job) -> String {
    let weighting = match job.weights() {
        Some(weights) if !weights.is_empty() => {
            let lines = weights
                .iter()
                .map(|(k, v)| format!("- {}: {}", k, v))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "Weight the dimensions as follows when computing overallScore:\n{}",
                lines
            )
        }
        _ => "Weight all five dimensions equally when computing overallScore.".to_string(),
    };

    format!(
        r#"You are a senior hiring assessor reviewing a completed job simulation interview.

Role: {title}
Simulation type: {simulation_type}
Seniority: {seniority}

Role description:
{description}

Score the candidate from 0 to 100 on each dimension:
- decisionQuality: soundness of the choices made in each scenario
- communicationClarity: how clearly and concisely the candidate explains themselves
- structuredProcess: whether the candidate follows a deliberate, repeatable approach
- riskAwareness: recognition of risks, trade-offs and second-order effects
- professionalJudgment: ethics, tone and maturity appropriate to the seniority
{weighting}

Respond with exactly one JSON object and nothing else:
{{
  "overallScore": 0,
  "decisionQuality": 0,
  "communicationClarity": 0,
  "structuredProcess": 0,
  "riskAwareness": 0,
  "professionalJudgment": 0,
  "recommendation": "strong_hire|hire|maybe|no_hire|strong_no_hire",
  "summary": "<two to four sentences>",
  "strengths": ["..."],
  "concerns": ["..."]
}}"#,
        title = job.title,
        simulation_type = job.simulation_type,
        seniority = job.seniority,
        description = job.description,
        weighting = weighting,
    )
}

/// Rounds and clamps a raw model value into `0..=100`.
///
/// Numbers and numeric strings are accepted; anything else scores 0.
pub fn clamp_score(raw: Option<&JsonValue>) -> i32 {
    let value = match raw {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match value {
        Some(v) if v.is_finite() => v.round().clamp(0.0, 100.0) as i32,
        _ => 0,
    }
}

fn lookup<'a>(raw: &'a JsonValue, camel: &str, snake: &str) -> Option<&'a JsonValue> {
    raw.get(camel).or_else(|| raw.get(snake))
}

fn string_list(raw: Option<&JsonValue>) -> Vec<String> {
    raw.and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Coerces a raw scoring result into a scorecard that is safe to persist.
pub fn normalize_scorecard(raw: &JsonValue) -> Scorecard {
    let score = |camel: &str, snake: &str| clamp_score(lookup(raw, camel, snake));
    Scorecard {
        overall_score: score("overallScore", "overall_score"),
        decision_quality: score(DIMENSIONS[0].1, DIMENSIONS[0].0),
        communication_clarity: score(DIMENSIONS[1].1, DIMENSIONS[1].0),
        structured_process: score(DIMENSIONS[2].1, DIMENSIONS[2].0),
        risk_awareness: score(DIMENSIONS[3].1, DIMENSIONS[3].0),
        professional_judgment: score(DIMENSIONS[4].1, DIMENSIONS[4].0),
        recommendation: raw
            .get("recommendation")
            .and_then(|v| v.as_str())
            .and_then(Recommendation::parse)
            .unwrap_or(Recommendation::Maybe),
        summary: raw
            .get("summary")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SUMMARY)
            .to_string(),
        strengths: string_list(raw.get("strengths")),
        concerns: string_list(raw.get("concerns")),
    }
}

/// Neutral scorecard recorded when the scoring call could not complete.
pub fn fallback_scorecard() -> Scorecard {
    Scorecard {
        overall_score: FALLBACK_SCORE,
        decision_quality: FALLBACK_SCORE,
        communication_clarity: FALLBACK_SCORE,
        structured_process: FALLBACK_SCORE,
        risk_awareness: FALLBACK_SCORE,
        professional_judgment: FALLBACK_SCORE,
        recommendation: Recommendation::Maybe,
        summary: FALLBACK_SUMMARY.to_string(),
        strengths: vec!["Completed the simulation interview.".to_string()],
        concerns: vec!["Automated scoring unavailable; responses not yet assessed.".to_string()],
    }
}

#[derive(Clone)]
pub struct EvaluationScorer {
    gateway: Arc<dyn ModelGateway>,
}

impl EvaluationScorer {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Always yields a well-formed scorecard; gateway failures degrade to
    /// [`fallback_scorecard`].
    pub async fn score(&self, job: &Job, history: &[Message]) -> Scorecard {
        let request = CompletionRequest {
            system: build_system_prompt(job),
            turns: vec![ChatTurn::user(format!(
                "Interview transcript:\n\n{}",
                render_transcript(history)
            ))],
        };

        match self.gateway.complete(request).await {
            Ok(raw) => normalize_scorecard(&raw),
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "Scoring fell back after model gateway failure");
                fallback_scorecard()
            }
        }
    }
}
