use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_CONTEXT_CHARS: usize = 8000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub const SYSTEM_PREAMBLE: &str = "Eres un asistente útil que responde preguntas basadas en el siguiente contenido de un documento PDF:\n\n";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Number of document characters placed in the system instruction.
    pub context_chars: usize,
    pub bind_addr: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            context_chars: DEFAULT_CONTEXT_CHARS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("CLAUDE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("CLAUDE_API_KEY environment variable not set"))?;

        let mut config = Self::new(api_key);

        if let Some(model) = lookup("CLAUDE_MODEL") {
            config.model = model;
        }
        if let Some(base_url) = lookup("CLAUDE_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(bind_addr) = lookup("PDF_QA_BIND_ADDR") {
            config.bind_addr = bind_addr;
        }
        config.max_tokens = parse_or(&lookup, "PDF_QA_MAX_TOKENS", config.max_tokens)?;
        config.temperature = parse_or(&lookup, "PDF_QA_TEMPERATURE", config.temperature)?;
        config.context_chars = parse_or(&lookup, "PDF_QA_CONTEXT_CHARS", config.context_chars)?;
        config.max_upload_bytes =
            parse_or(&lookup, "PDF_QA_MAX_UPLOAD_BYTES", config.max_upload_bytes)?;

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
