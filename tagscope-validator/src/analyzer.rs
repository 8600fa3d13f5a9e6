//! Narrative analysis collaborator
//!
//! Turns the capped validation excerpt into human-readable prose through
//! an external chat-completion API. The pipeline only sees the
//! [`Summarize`] capability; the Flow adapter below is one implementation.
//! Unavailability of the collaborator never fails validation: callers go
//! through [`narrative_or_placeholder`], which degrades to a clearly
//! marked placeholder string.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tagscope_common::config::FlowCredentials;
use tagscope_common::model::CappedSummary;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const AUTH_URL: &str = "https://flow.ciandt.com/auth-engine-api/v1/api-key/token";
const CHAT_URL: &str = "https://flow.ciandt.com/ai-orchestration-api/v1/openai/chat/completions";
const USER_AGENT: &str = "tagscope/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;
// Slightly under the server-side hour so a cached token is never stale.
const TOKEN_LIFESPAN_SECS: u64 = 3500;
const MAX_COMPLETION_TOKENS: u32 = 1500;

/// Narrative collaborator errors
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Capability: turn a capped summary into narrative prose.
#[async_trait]
pub trait Summarize: Send + Sync {
    async fn summarize(&self, excerpt: &CappedSummary) -> Result<String, AnalyzerError>;
}

/// Produce narrative text, falling back to a marked placeholder.
///
/// `None` means the collaborator is not configured; an `Err` from the
/// collaborator is logged and replaced. Report generation always proceeds.
pub async fn narrative_or_placeholder(
    summarizer: Option<&dyn Summarize>,
    excerpt: &CappedSummary,
) -> String {
    match summarizer {
        None => "[narrative analysis unavailable: collaborator not configured]".to_string(),
        Some(s) => match s.summarize(excerpt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Narrative collaborator failed; using placeholder");
                format!("[narrative analysis unavailable: {}]", e)
            }
        },
    }
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    #[serde(rename = "clientId")]
    client_id: &'a str,
    #[serde(rename = "clientSecret")]
    client_secret: &'a str,
    #[serde(rename = "appToAccess")]
    app_to_access: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    model: &'a str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Flow chat-completions adapter
///
/// Fetches a bearer token on first use and caches it in memory until
/// shortly before expiry.
pub struct FlowClient {
    http_client: reqwest::Client,
    credentials: FlowCredentials,
    token: Mutex<Option<CachedToken>>,
}

impl FlowClient {
    pub fn new(credentials: FlowCredentials) -> Result<Self, AnalyzerError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AnalyzerError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Obtain or renew the bearer token.
    async fn get_token(&self) -> Result<String, AnalyzerError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting Flow API token");
        let response = self
            .http_client
            .post(AUTH_URL)
            .header("FlowTenant", &self.credentials.tenant)
            .json(&TokenRequest {
                client_id: &self.credentials.client_id,
                client_secret: &self.credentials.client_secret,
                app_to_access: "llm-api",
            })
            .send()
            .await
            .map_err(|e| AnalyzerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Auth(format!("{}: {}", status.as_u16(), body)));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Parse(e.to_string()))?;
        let value = body
            .access_token
            .ok_or_else(|| AnalyzerError::Auth("token missing from response".to_string()))?;

        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(TOKEN_LIFESPAN_SECS),
        });
        Ok(value)
    }

    fn build_prompt(excerpt: &CappedSummary) -> Result<String, AnalyzerError> {
        let data = serde_json::to_string_pretty(excerpt)
            .map_err(|e| AnalyzerError::Parse(e.to_string()))?;
        Ok(format!(
            "Analyze the tagging validation results below and provide:\n\
             1. An overall summary of the situation\n\
             2. Patterns or systematic problems you identified\n\
             3. Likely root causes for missing events\n\
             4. Likely root causes for fields with errors\n\
             5. Specific recommendations to fix the problems\n\
             6. A conclusion on the overall tagging quality\n\n\
             Validation data:\n{}\n\n\
             If there are no problems, write a positive analysis highlighting \
             the quality of the implementation.",
            data
        ))
    }
}

#[async_trait]
impl Summarize for FlowClient {
    async fn summarize(&self, excerpt: &CappedSummary) -> Result<String, AnalyzerError> {
        let token = self.get_token().await?;

        let request = ChatRequest {
            stream: false,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a QA specialist in analytics tag validation. \
                              Provide detailed analysis and insights on the problems found."
                        .to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_prompt(excerpt)?,
                },
            ],
            max_tokens: MAX_COMPLETION_TOKENS,
            model: &self.credentials.model,
            temperature: 0.2,
        };

        let response = self
            .http_client
            .post(CHAT_URL)
            .header("FlowTenant", &self.credentials.tenant)
            .header("FlowAgent", "tagscope")
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Api(status.as_u16(), body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| AnalyzerError::Parse("response carried no choices".to_string()))
    }
}
