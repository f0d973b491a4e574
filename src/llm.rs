//! Chat model seam and the OpenAI chat-completions client behind it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Cannot reach chat service: {0}")]
    Connection(String),

    #[error("Chat request timed out after {0}s")]
    Timeout(u64),

    #[error("Chat service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected chat response: {0}")]
    ResponseParsing(String),

    #[error("Chat request failed: {0}")]
    Http(String),
}

/// One system+user prompt in, completion text out. Both the analysis stage
/// and multi-query expansion talk to the model through this.
pub trait ChatModel: Send + Sync {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// OpenAI `/v1/chat/completions` client.
pub struct OpenAiChat {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
}

impl OpenAiChat {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: config::OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            timeout_secs: 120,
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ChatModel for OpenAiChat {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Connection(e.to_string())
                } else if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::ResponseParsing("empty choices array".to_string()))
    }
}

/// Canned-response chat model for tests.
pub struct MockChatModel {
    response: Result<String, String>,
}

impl MockChatModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
        }
    }
}

impl ChatModel for MockChatModel {
    fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(LlmError::Http(message.clone())),
        }
    }
}
