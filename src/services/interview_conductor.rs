use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::flag::{DetectedFlag, FlagSeverity};
use crate::models::job::Job;
use crate::models::message::{Message, MessageRole};
use crate::services::model_gateway::{ChatTurn, CompletionRequest, ModelGateway};

pub const CLARIFYING_PROMPT: &str =
    "Thank you for sharing that. Could you walk me through your reasoning in a bit more detail?";
pub const OPENING_FALLBACK: &str = "Welcome, and thank you for joining this simulation. \
To start, could you briefly describe how you would approach the first situation you face in this role?";

const DEFAULT_FLAG_CATEGORY: &str = "general";
const DEFAULT_FLAG_EXCERPT: &str = "No excerpt provided.";

/// The conductor's own reading of what the current turn is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStage {
    Introduction,
    Questioning,
    FollowUp,
    Closing,
}

impl InterviewStage {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "introduction" => Some(Self::Introduction),
            "questioning" => Some(Self::Questioning),
            "follow_up" => Some(Self::FollowUp),
            "closing" => Some(Self::Closing),
            _ => None,
        }
    }
}

/// Progress parameters a turn's prompt is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnContext {
    /// Interviewer turns already in the transcript, excluding the one being generated.
    pub question_count: usize,
    pub num_questions: usize,
}

impl TurnContext {
    pub fn new(job: &Job, history: &[Message]) -> Self {
        Self {
            question_count: question_count(history),
            num_questions: job.num_questions.max(1) as usize,
        }
    }

    pub fn is_first_turn(&self) -> bool {
        self.question_count == 0
    }

    /// `question_count >= num_questions - 1`
    pub fn closing_eligible(&self) -> bool {
        self.question_count + 1 >= self.num_questions
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConductorTurn {
    pub message: String,
    pub flags: Vec<DetectedFlag>,
    pub stage: InterviewStage,
}

pub fn question_count(history: &[Message]) -> usize {
    history
        .iter()
        .filter(|m| m.role == MessageRole::Assistant)
        .count()
}

pub fn build_system_prompt(job: &Job, ctx: &TurnContext) -> String {
    let pacing = if ctx.is_first_turn() {
        "This is the start of the interview. Greet the candidate warmly, briefly set the scene \
         for the simulation, and ask your first question."
            .to_string()
    } else if ctx.closing_eligible() {
        "The question budget is nearly spent. Acknowledge the candidate's last answer and wrap \
         up the interview gracefully: thank them and tell them they can submit when ready. Do \
         not open a new line of questioning."
            .to_string()
    } else {
        format!(
            "Continue the interview. {} of {} questions have been asked so far.",
            ctx.question_count, ctx.num_questions
        )
    };

    format!(
        r#"You are an experienced interviewer running a realistic job simulation.

Role: {title}
Simulation type: {simulation_type}
Seniority: {seniority}
Time limit: {time_limit} minutes
Question budget: {num_questions} questions
Questions asked so far: {question_count}

Role description:
{description}

Rules:
1. Ask exactly ONE scenario-based question per turn that is relevant to this role.
2. Adapt to the candidate's latest answer; probe vague or incomplete reasoning.
3. Watch for red flags: inconsistency with earlier answers, evasiveness, shallow answers,
   unprofessional tone, and poor judgment. Report each one you observe in this turn.
4. {pacing}

Respond with exactly one JSON object and nothing else:
{{
  "assistant_message": "<your next message to the candidate>",
  "detected_flags": [{{"severity": "low|medium|high", "category": "<short label>", "excerpt": "<quote or summary>"}}],
  "stage": "introduction|questioning|follow_up|closing"
}}
Use "introduction" only for the very first message and "closing" once you are wrapping up."#,
        title = job.title,
        simulation_type = job.simulation_type,
        seniority = job.seniority,
        time_limit = job.time_limit_minutes,
        num_questions = ctx.num_questions,
        question_count = ctx.question_count,
        description = job.description,
        pacing = pacing,
    )
}

/// Coerces whatever the model returned into a usable turn.
pub fn normalize_turn(raw: &JsonValue) -> ConductorTurn {
    let message = raw
        .get("assistant_message")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(CLARIFYING_PROMPT)
        .to_string();

    let flags = raw
        .get("detected_flags")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(normalize_flag).collect())
        .unwrap_or_default();

    let stage = raw
        .get("stage")
        .and_then(|v| v.as_str())
        .and_then(InterviewStage::parse)
        .unwrap_or(InterviewStage::Questioning);

    ConductorTurn {
        message,
        flags,
        stage,
    }
}

fn normalize_flag(v: &JsonValue) -> Option<DetectedFlag> {
    let obj = v.as_object()?;
    let text = |key: &str, default: &str| {
        obj.get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
            .to_string()
    };
    Some(DetectedFlag {
        severity: obj
            .get("severity")
            .and_then(|v| v.as_str())
            .and_then(FlagSeverity::parse)
            .unwrap_or(FlagSeverity::Medium),
        category: text("category", DEFAULT_FLAG_CATEGORY),
        excerpt: text("excerpt", DEFAULT_FLAG_EXCERPT),
    })
}

/// Deterministic turn used when the gateway call fails outright.
pub fn fallback_turn(ctx: &TurnContext) -> ConductorTurn {
    if ctx.is_first_turn() {
        ConductorTurn {
            message: OPENING_FALLBACK.to_string(),
            flags: Vec::new(),
            stage: InterviewStage::Introduction,
        }
    } else {
        ConductorTurn {
            message: CLARIFYING_PROMPT.to_string(),
            flags: Vec::new(),
            stage: InterviewStage::Questioning,
        }
    }
}

/// Produces the interviewer's next turn from the job and the transcript so far.
///
/// Stateless between calls: everything it knows comes from `history`, which
/// must already include the candidate's latest message.
#[derive(Clone)]
pub struct InterviewConductor {
    gateway: Arc<dyn ModelGateway>,
}

impl InterviewConductor {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    pub fn request_for(job: &Job, history: &[Message]) -> (TurnContext, CompletionRequest) {
        let ctx = TurnContext::new(job, history);
        let request = CompletionRequest {
            system: build_system_prompt(job, &ctx),
            turns: history.iter().map(ChatTurn::from).collect(),
        };
        (ctx, request)
    }

    pub async fn next_turn(&self, job: &Job, history: &[Message]) -> (TurnContext, ConductorTurn) {
        let (ctx, request) = Self::request_for(job, history);
        let mut turn = match self.gateway.complete(request).await {
            Ok(raw) => normalize_turn(&raw),
            Err(e) => {
                tracing::warn!(
                    job_id = %job.id,
                    question_count = ctx.question_count,
                    error = %e,
                    "Interview turn fell back after model gateway failure"
                );
                fallback_turn(&ctx)
            }
        };
        if turn.stage == InterviewStage::Introduction && !ctx.is_first_turn() {
            turn.stage = InterviewStage::Questioning;
        }
        (ctx, turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::model_gateway::{ChatRole, GatewayError, MockModelGateway};
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn job(num_questions: i32) -> Job {
        Job {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Operations Manager".into(),
            description: "Run a warehouse night shift.".into(),
            simulation_type: "operations".into(),
            seniority: "mid".into(),
            time_limit_minutes: 20,
            num_questions,
            scoring_weights: None,
            share_token: "share".into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn msg(seq: i64, role: MessageRole, content: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            application_id: Uuid::nil(),
            seq,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    fn history(assistant_turns: usize) -> Vec<Message> {
        let mut out = Vec::new();
        let mut seq = 0;
        for i in 0..assistant_turns {
            seq += 1;
            out.push(msg(seq, MessageRole::Assistant, &format!("Question {i}")));
            seq += 1;
            out.push(msg(seq, MessageRole::User, &format!("Answer {i}")));
        }
        out
    }

    #[test]
    fn empty_history_is_the_first_turn() {
        let ctx = TurnContext::new(&job(5), &[]);
        assert_eq!(ctx.question_count, 0);
        assert!(ctx.is_first_turn());
        assert!(!ctx.closing_eligible());
        assert!(build_system_prompt(&job(5), &ctx).contains("start of the interview"));
    }

    #[test]
    fn question_count_only_counts_interviewer_turns() {
        let h = history(2);
        assert_eq!(h.len(), 4);
        assert_eq!(question_count(&h), 2);
    }

    #[test]
    fn two_of_three_questions_is_closing_eligible() {
        let ctx = TurnContext::new(&job(3), &history(2));
        assert_eq!(ctx.question_count, 2);
        assert!(ctx.closing_eligible());
        let prompt = build_system_prompt(&job(3), &ctx);
        assert!(prompt.contains("Questions asked so far: 2"));
        assert!(prompt.contains("wrap up the interview gracefully"));
    }

    #[test]
    fn one_of_three_questions_is_not_closing() {
        let ctx = TurnContext::new(&job(3), &history(1));
        assert!(!ctx.closing_eligible());
        assert!(!ctx.is_first_turn());
    }

    #[test]
    fn single_question_budget_closes_after_the_opening() {
        let opening = TurnContext::new(&job(1), &[]);
        assert!(opening.is_first_turn());
        assert!(opening.closing_eligible());
        assert!(build_system_prompt(&job(1), &opening).contains("start of the interview"));
        assert!(TurnContext::new(&job(1), &history(1)).closing_eligible());
    }

    #[test]
    fn malformed_output_is_normalized() {
        let raw = json!({"assistant_message": "", "detected_flags": "not-an-array", "stage": "bogus"});
        let turn = normalize_turn(&raw);
        assert_eq!(turn.message, CLARIFYING_PROMPT);
        assert!(turn.flags.is_empty());
        assert_eq!(turn.stage, InterviewStage::Questioning);
    }

    #[test]
    fn non_object_output_is_normalized() {
        for raw in [json!(null), json!([1, 2]), json!("text"), json!(42)] {
            let turn = normalize_turn(&raw);
            assert!(!turn.message.is_empty());
            assert!(turn.flags.is_empty());
            assert_eq!(turn.stage, InterviewStage::Questioning);
        }
    }

    #[test]
    fn flag_entries_are_defaulted_or_skipped() {
        let raw = json!({
            "assistant_message": "  What would you do next?  ",
            "detected_flags": [
                {"severity": "HIGH", "category": "evasiveness", "excerpt": "Avoided the question"},
                {"severity": "catastrophic", "category": 7},
                "loose string",
                {"severity": "critical", "category": "judgment", "excerpt": "Ignored safety"}
            ],
            "stage": "follow_up"
        });
        let turn = normalize_turn(&raw);
        assert_eq!(turn.message, "What would you do next?");
        assert_eq!(turn.stage, InterviewStage::FollowUp);
        assert_eq!(turn.flags.len(), 3);
        assert_eq!(turn.flags[0].severity, FlagSeverity::High);
        assert_eq!(turn.flags[1].severity, FlagSeverity::Medium);
        assert_eq!(turn.flags[1].category, DEFAULT_FLAG_CATEGORY);
        assert_eq!(turn.flags[1].excerpt, DEFAULT_FLAG_EXCERPT);
        assert_eq!(turn.flags[2].severity, FlagSeverity::Critical);
    }

    #[tokio::test]
    async fn request_carries_full_history_in_order() {
        let h = history(1);
        let mut gateway = MockModelGateway::new();
        gateway
            .expect_complete()
            .withf(|req| {
                req.turns.len() == 2
                    && req.turns[0].role == ChatRole::Assistant
                    && req.turns[1].role == ChatRole::User
                    && req.turns[1].content == "Answer 0"
                    && req.system.contains("Questions asked so far: 1")
            })
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "assistant_message": "How would you staff a sudden absence?",
                    "detected_flags": [],
                    "stage": "questioning"
                }))
            });

        let conductor = InterviewConductor::new(Arc::new(gateway));
        let (ctx, turn) = conductor.next_turn(&job(4), &h).await;
        assert_eq!(ctx.question_count, 1);
        assert_eq!(turn.stage, InterviewStage::Questioning);
        assert_eq!(turn.message, "How would you staff a sudden absence?");
    }

    #[tokio::test]
    async fn introduction_is_only_kept_on_the_first_turn() {
        let mut gateway = MockModelGateway::new();
        gateway.expect_complete().times(2).returning(|_| {
            Ok(json!({"assistant_message": "Welcome!", "detected_flags": [], "stage": "introduction"}))
        });
        let conductor = InterviewConductor::new(Arc::new(gateway));

        let (_, opening) = conductor.next_turn(&job(3), &[]).await;
        assert_eq!(opening.stage, InterviewStage::Introduction);
        let (_, later) = conductor.next_turn(&job(3), &history(1)).await;
        assert_eq!(later.stage, InterviewStage::Questioning);
    }

    #[tokio::test]
    async fn gateway_failure_uses_fallback_turn() {
        let mut gateway = MockModelGateway::new();
        gateway.expect_complete().times(2).returning(|_| {
            Err(GatewayError::Api {
                status: 503,
                message: "unavailable".into(),
            })
        });
        let conductor = InterviewConductor::new(Arc::new(gateway));

        let (_, opening) = conductor.next_turn(&job(3), &[]).await;
        assert_eq!(opening.stage, InterviewStage::Introduction);
        assert_eq!(opening.message, OPENING_FALLBACK);

        let (_, later) = conductor.next_turn(&job(3), &history(1)).await;
        assert_eq!(later.stage, InterviewStage::Questioning);
        assert_eq!(later.message, CLARIFYING_PROMPT);
        assert!(later.flags.is_empty());
    }
}
