use crate::config::Config;
use crate::models::*;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A chat-completion backend: one request per question, no retries.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, system: &str, turns: &[Turn]) -> Result<String, GenerationError>;
}

pub struct ClaudeService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ClaudeService {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn build_request(&self, system: &str, turns: &[Turn]) -> ClaudeRequest {
        ClaudeRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: system.to_string(),
            messages: turns.to_vec(),
        }
    }
}

#[async_trait]
impl AnswerGenerator for ClaudeService {
    async fn generate(&self, system: &str, turns: &[Turn]) -> Result<String, GenerationError> {
        let request = self.build_request(system, turns);
        let url = format!("{}/v1/messages", self.base_url);

        log::debug!(
            "Claude request: model={} turns={} system_chars={}",
            request.model,
            request.messages.len(),
            request.system.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let claude_response: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        claude_response
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or(GenerationError::EmptyResponse)
    }
}
