#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value as JsonValue};
use simhire_backend::{
    config::{InterviewPolicy, JobLimits},
    database::MemoryStore,
    middleware::auth::Claims,
    routes::build_router,
    services::model_gateway::{CompletionRequest, GatewayError, ModelGateway},
    AppSettings, AppState,
};
use tokio::sync::Notify;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret_key";

/// Gateway double that answers interview prompts with a question and scoring
/// prompts with a fixed scorecard.
#[derive(Default)]
pub struct ScriptedGateway {
    pub fail_scoring: bool,
    pub fail_interview: bool,
    pub calls: AtomicUsize,
    /// When set, interview calls signal `entered` and wait on `release`.
    pub gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<JsonValue, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.system.contains("hiring assessor") {
            if self.fail_scoring {
                return Err(GatewayError::Api {
                    status: 503,
                    message: "overloaded".into(),
                });
            }
            return Ok(json!({
                "overallScore": 68,
                "decisionQuality": 70,
                "communicationClarity": 65,
                "structuredProcess": 72,
                "riskAwareness": 60,
                "professionalJudgment": 71,
                "recommendation": "hire",
                "summary": "Solid, methodical answers.",
                "strengths": ["Prioritises customer impact"],
                "concerns": ["Could quantify risk better"]
            }));
        }

        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        if self.fail_interview {
            return Err(GatewayError::EmptyContent);
        }
        let asked = request
            .turns
            .iter()
            .filter(|t| t.content.starts_with("Question"))
            .count();
        let flags = if request.turns.iter().any(|t| t.content.contains("whatever")) {
            json!([{"severity": "high", "category": "professionalism", "excerpt": "whatever"}])
        } else {
            json!([])
        };
        let stage = if asked == 0 { "introduction" } else { "questioning" };
        Ok(json!({
            "assistant_message": format!("Question {}: what would you do next?", asked + 1),
            "detected_flags": flags,
            "stage": stage
        }))
    }
}

pub fn app(gateway: Arc<ScriptedGateway>) -> Router {
    app_with_policy(gateway, InterviewPolicy::default())
}

pub fn app_with_policy(gateway: Arc<ScriptedGateway>, interview: InterviewPolicy) -> Router {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        gateway,
        AppSettings {
            jwt_secret: JWT_SECRET.to_string(),
            job_limits: JobLimits::default(),
            interview,
        },
    );
    build_router(state)
}

pub fn token_for(sub: &str, role: &str, ttl_secs: i64) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (chrono::Utc::now().timestamp() + ttl_secs) as usize,
        role: Some(role.to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("sign token")
}

pub fn recruiter_token(id: Uuid) -> String {
    token_for(&id.to_string(), "recruiter", 3600)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    let res = app.clone().oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), 1024 * 1024).await.expect("body");
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}

pub fn job_payload() -> JsonValue {
    json!({
        "title": "Customer Success Lead",
        "description": "Keep enterprise customers happy and renewing.",
        "simulation_type": "customer_success",
        "seniority": "senior",
        "time_limit_minutes": 30,
        "num_questions": 3,
        "scoring_weights": {"communication_clarity": 40, "risk_awareness": 20}
    })
}

/// Creates a job as `owner` and returns `(job_id, share_token)`.
pub async fn create_job(app: &Router, owner: Uuid) -> (String, String) {
    let token = recruiter_token(owner);
    let (status, body) = send(app, "POST", "/api/recruiter/jobs", Some(&token), Some(job_payload())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (
        body["id"].as_str().expect("id").to_string(),
        body["share_token"].as_str().expect("share_token").to_string(),
    )
}

/// Applies to the job behind `share_token` and returns the application id.
pub async fn apply(app: &Router, share_token: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/public/jobs/{}/applications", share_token),
        None,
        Some(json!({
            "candidate_name": "Jordan Lee",
            "candidate_email": "jordan@example.com",
            "location": "Lisbon",
            "availability": "  "
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().expect("id").to_string()
}
