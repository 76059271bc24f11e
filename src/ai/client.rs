//! OpenAI chat completions client

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::AiConfig;
use crate::constants::{API_TIMEOUT_SECS, OPENAI_API_URL};

/// Errors from a single completion request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rate limit or exhausted quota; worth retrying with backoff
    #[error("API rate limited ({status}): {message}")]
    RateLimited { status: StatusCode, message: String },
    /// Any other non-success response from the API
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },
    /// Request never produced a response (network, TLS, timeout)
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// A success response that carried no completion text
    #[error("API response contained no completion content")]
    EmptyResponse,
}

impl ApiError {
    /// Whether the error is a transient rate/quota condition.
    ///
    /// HTTP 429 is the structured signal; the substring check on the message
    /// mirrors how upstream quota errors are usually worded and is assumed,
    /// not guaranteed, to stay that way.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::RateLimited { .. } => true,
            ApiError::Api { message, .. } => {
                let lower = message.to_lowercase();
                lower.contains("rate") || lower.contains("quota")
            }
            _ => false,
        }
    }
}

/// Abstraction over the completion call so the batch orchestrator can be
/// exercised with a scripted fake.
pub trait CompletionApi {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, ApiError>>;
}

/// OpenAI API client for chat completions
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error body shape returned by the API on failures.
#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl OpenAiClient {
    /// Create a new client from a resolved API key
    pub fn new(api_key: String, config: &AiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    async fn request(&self, prompt: &str) -> Result<String, ApiError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ApiError::RateLimited { status, message });
            }
            return Err(ApiError::Api { status, message });
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ApiError::EmptyResponse)
    }
}

impl CompletionApi for OpenAiClient {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, ApiError>> {
        self.request(prompt)
    }
}

/// Build a live client from the resolved key, degrading to mock mode
/// (`None`) when the key is empty or construction fails. Never fatal.
pub fn init_client(api_key: &str, config: &AiConfig) -> Option<OpenAiClient> {
    if api_key.is_empty() {
        tracing::warn!("No API key provided. Running in mock mode.");
        return None;
    }

    match OpenAiClient::new(api_key.to_string(), config) {
        Ok(client) => {
            tracing::info!("OpenAI client initialized (model {})", config.model);
            Some(client)
        }
        Err(e) => {
            tracing::warn!("Failed to initialize OpenAI client, running in mock mode: {e:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, message: &str) -> ApiError {
        ApiError::Api {
            status: StatusCode::from_u16(status).unwrap(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_429_is_transient() {
        let err = ApiError::RateLimited {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "slow down".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_quota_message_is_transient() {
        assert!(api_error(403, "You exceeded your current quota").is_transient());
        assert!(api_error(500, "Rate limit reached for requests").is_transient());
    }

    #[test]
    fn test_other_errors_are_fatal() {
        assert!(!api_error(400, "invalid request body").is_transient());
        assert!(!api_error(401, "incorrect API key").is_transient());
        assert!(!ApiError::EmptyResponse.is_transient());
    }

    #[test]
    fn test_init_client_empty_key_is_mock_mode() {
        let config = AiConfig::default();
        assert!(init_client("", &config).is_none());
        assert!(init_client("sk-test", &config).is_some());
    }
}
