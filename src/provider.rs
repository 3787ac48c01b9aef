//! Chat-completion client used by the correction proxy
//!
//! Speaks the OpenAI-compatible `/v1/chat/completions` API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::Config;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that corrects text grammatically.";

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider API key not configured")]
    MissingCredential,

    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Body is kept for logs only and never forwarded to callers
    #[error("provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("provider response contained no choices")]
    EmptyChoices,
}

/// Anything that can turn text into its grammatically corrected form
#[async_trait]
pub trait Corrector: Send + Sync {
    async fn correct(&self, text: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage>,
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// Client for the upstream chat-completion provider
pub struct ProviderClient {
    client: Client,
    config: Config,
}

impl ProviderClient {
    pub fn new(config: Config) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Check if a credential is available
    pub fn is_available(&self) -> bool {
        self.config.get_api_key().is_some()
    }

    fn build_messages(text: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: format!("For given text: {} \n Corrected text is:", text),
            },
        ]
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.provider.base_url.trim_end_matches('/')
        )
    }

    /// Pull the first choice's message content out of a raw provider body
    fn parse_response(body: &str) -> Result<String, ProviderError> {
        let response: ChatResponse =
            serde_json::from_str(body).map_err(ProviderError::MalformedResponse)?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyChoices)
    }
}

#[async_trait]
impl Corrector for ProviderClient {
    async fn correct(&self, text: &str) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .get_api_key()
            .ok_or(ProviderError::MissingCredential)?;

        let request = ChatRequest {
            messages: Self::build_messages(text),
            model: &self.config.provider.model,
            max_tokens: self.config.provider.max_tokens,
            temperature: self.config.provider.temperature,
        };

        tracing::debug!("Requesting correction from {}", self.completions_url());

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status { status, body });
        }

        Self::parse_response(&body)
    }
}
