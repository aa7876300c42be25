//! Model client for root-cause analysis completions.
//!
//! The pipeline treats the model as an opaque collaborator: prompt in,
//! text out, may fail or time out. [`OpenAiClient`] talks to any
//! OpenAI-compatible chat-completions endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{Result, TriageError};

const SYSTEM_PROMPT: &str = "You are an expert debugging assistant. Provide clear, \
actionable analysis based only on the provided context.";

/// Low randomness keeps repeated analyses of the same error stable.
const TEMPERATURE: f32 = 0.1;

/// Bounded output length per analysis.
const MAX_TOKENS: u32 = 2000;

/// One completion from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutput {
    /// The analysis text.
    pub text: String,

    /// Identifier of the model that answered.
    pub model: String,
}

/// Capability: turn a prompt into one completion.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<ModelOutput>;
}

/// Configuration for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl ModelConfig {
    /// Read `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.model),
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout: defaults.request_timeout,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Option<Vec<ChatChoice>>,
}

/// Client for OpenAI-compatible chat-completions APIs.
pub struct OpenAiClient {
    client: reqwest::Client,
    config: ModelConfig,
}

impl OpenAiClient {
    pub fn new(config: ModelConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tracelens/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    pub fn from_env() -> Self {
        Self::new(ModelConfig::from_env())
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<ModelOutput> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TriageError::Model(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::Model(format!(
                "completion endpoint returned {status}"
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| TriageError::Model(e.to_string()))?;

        let text = body
            .choices
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.message.content)
            .ok_or_else(|| TriageError::Model("empty completion".to_string()))?;

        Ok(ModelOutput {
            text: text.trim().to_string(),
            model: body.model.unwrap_or_else(|| self.config.model.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.base_url.contains("api.openai.com"));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_chat_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: "hi".to_string(),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!((json["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
