use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shown in place of an answer when the model call fails.
pub const GENERATION_ERROR_PREFIX: &str = "Error al generar respuesta:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Why a model call produced no answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("the model returned no text content")]
    EmptyResponse,
}

/// Outcome of one question. Failed answers are kept for display but never
/// sent back to the model as assistant turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Reply(String),
    Failed(GenerationError),
}

impl Answer {
    pub fn is_reply(&self) -> bool {
        matches!(self, Answer::Reply(_))
    }

    pub fn text(&self) -> String {
        match self {
            Answer::Reply(text) => text.clone(),
            Answer::Failed(err) => format!("{} {}", GENERATION_ERROR_PREFIX, err),
        }
    }
}

impl From<Result<String, GenerationError>> for Answer {
    fn from(result: Result<String, GenerationError>) -> Self {
        match result {
            Ok(text) => Answer::Reply(text),
            Err(err) => Answer::Failed(err),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub question: String,
    pub answer: Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Debug, Serialize)]
pub struct ClaudeRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system: String,
    pub messages: Vec<Turn>,
}

#[derive(Debug, Deserialize)]
pub struct ClaudeResponse {
    pub content: Vec<ClaudeContentBlock>,
}

#[derive(Debug, Deserialize)]
pub struct ClaudeContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_answer_text_carries_error_prefix() {
        let answer = Answer::Failed(GenerationError::Network("connection refused".to_string()));
        assert_eq!(
            answer.text(),
            "Error al generar respuesta: network error: connection refused"
        );
        assert!(!answer.is_reply());
    }

    #[test]
    fn turns_serialize_with_lowercase_roles() {
        let json = serde_json::to_value(vec![Turn::user("hi"), Turn::assistant("hello")]).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ])
        );
    }
}
