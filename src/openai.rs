use crate::config::Config;
use crate::models::EntityKind;
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// What to translate, and into which language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJob {
    pub kind: EntityKind,
    /// Display name of the source language (e.g. "Croatian")
    pub source_language: String,
    /// Display name of the target language (e.g. "German")
    pub target_language: String,
    pub name: String,
    pub description: Option<String>,
}

/// A validated translation returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedText {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// Rate limits, server errors and network failures are worth retrying;
    /// other client errors and bad payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Status { status, .. } => *status == 429 || *status >= 500,
            ServiceError::Timeout | ServiceError::Transport(_) => true,
            ServiceError::Malformed(_) => false,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

/// The external text-generation service used to translate menu text.
#[async_trait]
pub trait MenuTranslator: Send + Sync {
    async fn translate(&self, job: &TranslationJob) -> Result<TranslatedText, ServiceError>;
}

/// OpenAI Chat Completion request for translation
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

const SYSTEM_PROMPT: &str =
    "You are a professional translator specialized in restaurant menus. Always respond with valid JSON.";

/// Build the user prompt for one entity and target language
fn build_translation_prompt(job: &TranslationJob) -> String {
    match job.kind {
        EntityKind::MenuItem => format!(
            r#"Translate the following restaurant menu item from {source} to {target}.
Keep the translation natural and appetizing for a restaurant menu.

{source} Name: {name}
{source} Description: {description}

Provide the translation in the following JSON format:
{{
    "name": "translated name",
    "description": "translated description"
}}"#,
            source = job.source_language,
            target = job.target_language,
            name = job.name,
            description = job.description.as_deref().unwrap_or(""),
        ),
        EntityKind::Category => format!(
            r#"Translate the following restaurant menu category name from {source} to {target}.
Keep the translation natural and appropriate for a restaurant menu category.

{source} Category Name: {name}

Provide the translation in the following JSON format:
{{
    "name": "translated category name"
}}"#,
            source = job.source_language,
            target = job.target_language,
            name = job.name,
        ),
    }
}

/// Validate the model's JSON answer against the name/description contract.
///
/// `name` must be a non-blank string. `description` is optional and only
/// kept for menu items; a blank description becomes `None`.
pub fn parse_translation_payload(
    content: &str,
    kind: EntityKind,
) -> Result<TranslatedText, ServiceError> {
    let trimmed = strip_code_fence(content.trim());

    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| ServiceError::Malformed(format!("not valid JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| ServiceError::Malformed("expected a JSON object".to_string()))?;

    let name = match object.get("name") {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(serde_json::Value::String(_)) => {
            return Err(ServiceError::Malformed("\"name\" is empty".to_string()))
        }
        Some(_) => {
            return Err(ServiceError::Malformed("\"name\" is not a string".to_string()))
        }
        None => return Err(ServiceError::Malformed("missing \"name\"".to_string())),
    };

    let description = if kind.has_description() {
        match object.get("description") {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => {
                Some(s.trim().to_string()).filter(|s| !s.is_empty())
            }
            Some(_) => {
                return Err(ServiceError::Malformed(
                    "\"description\" is not a string".to_string(),
                ))
            }
        }
    } else {
        None
    };

    Ok(TranslatedText { name, description })
}

/// Some models wrap JSON in a ```json fence even in JSON mode
fn strip_code_fence(content: &str) -> &str {
    content
        .strip_prefix("```json")
        .or_else(|| content.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(content)
}

/// Translator backed by an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct OpenAiTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    retry: RetryConfig,
}

impl OpenAiTranslator {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.openai_api_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            temperature: config.openai_temperature,
            timeout: Duration::from_secs(config.openai_timeout_secs),
            retry: RetryConfig::translation(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn request_once(&self, request: &ChatRequest) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ServiceError::Status { status, body });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(format!("unreadable completion: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ServiceError::Malformed("response contained no choices".to_string()))
    }
}

#[async_trait]
impl MenuTranslator for OpenAiTranslator {
    async fn translate(&self, job: &TranslationJob) -> Result<TranslatedText, ServiceError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: build_translation_prompt(job),
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let content = with_retry_if(
            &self.retry,
            &format!("Translation of '{}' to {}", job.name, job.target_language),
            || self.request_once(&request),
            ServiceError::is_retryable,
        )
        .await?;

        parse_translation_payload(&content, job.kind)
    }
}
