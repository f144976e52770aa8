//! Completion gateway — thin adapter around the external text-generation
//! service.
//!
//! The pipeline talks to exactly one operation,
//! [`CompletionGateway::complete`], which normalizes transport faults into
//! the [`GatewayError`] taxonomy and performs no retries — retry policy, if
//! any, belongs to the caller, and this pipeline performs none.
//!
//! [`HttpGateway`] speaks the OpenAI-compatible `/chat/completions` wire
//! format. Tests substitute scripted implementations of the trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Message role in a chat completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry in an ordered completion message sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The single operation the pipeline consumes from the completion service.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Request a completion for `messages` with the given token ceiling.
    ///
    /// # Errors
    ///
    /// One of the five [`GatewayError`] kinds. Never retried here.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, GatewayError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Production gateway over an OpenAI-compatible chat-completions endpoint.
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Build the gateway. Fails only if the HTTP client cannot be
    /// constructed (invalid TLS backend, etc.).
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("http client build failed: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionGateway for HttpGateway {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        if self.config.api_key.trim().is_empty() {
            return Err(GatewayError::AuthError);
        }

        // Log shape only — never the credential, never message content.
        debug!(
            messages = messages.len(),
            max_tokens,
            model = %self.config.model,
            "dispatching completion request"
        );

        let body = CompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens,
        };

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "completion request rejected");
            return Err(match status.as_u16() {
                429 => GatewayError::RateLimited,
                402 => GatewayError::QuotaExceeded,
                401 | 403 => GatewayError::AuthError,
                code => GatewayError::Unavailable(format!("upstream status {code}")),
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("malformed response body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }

        Ok(content)
    }
}
