use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::GatewayConfig;
use crate::models::message::{Message, MessageRole};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Completion returned empty content")]
    EmptyContent,

    #[error("Completion was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatTurn {
    fn from(m: &Message) -> Self {
        Self {
            role: match m.role {
                MessageRole::User => ChatRole::User,
                MessageRole::Assistant => ChatRole::Assistant,
            },
            content: m.content.clone(),
        }
    }
}

/// One JSON-mode completion: a system instruction plus ordered prior turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub turns: Vec<ChatTurn>,
}

/// Text-completion capability that answers with a single JSON object.
///
/// Implementations return the parsed JSON exactly as produced; shape checks
/// and fallbacks belong to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<JsonValue, GatewayError>;
}

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct OpenAiGateway {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: completions_endpoint(config.base_url.as_str()),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

fn completions_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    r#type: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat<'a>,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct RespChoiceMsg {
    content: Option<String>,
}

#[derive(Deserialize)]
struct RespChoice {
    message: RespChoiceMsg,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<RespChoice>,
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<JsonValue, GatewayError> {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        messages.push(Msg {
            role: "system",
            content: &request.system,
        });
        for turn in &request.turns {
            messages.push(Msg {
                role: match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                },
                content: &turn.content,
            });
        }

        let req = Req {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: 0.7,
            response_format: ResponseFormat {
                r#type: "json_object",
            },
            messages,
        };

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let message = res.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status, message });
        }

        let body: Resp = res.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GatewayError::EmptyContent)?;

        tracing::debug!(model = %self.model, chars = content.len(), "Completion received");
        parse_json_content(&content)
    }
}

/// Parses completion text as JSON, tolerating a surrounding markdown fence.
pub fn parse_json_content(text: &str) -> Result<JsonValue, GatewayError> {
    Ok(serde_json::from_str(strip_json_fences(text))?)
}

fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(rest) => {
            let rest = rest.trim_start();
            rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
        }
        None => text,
    }
}
