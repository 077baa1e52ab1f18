pub mod client;
pub mod gemini;
pub mod openai;

use std::sync::Arc;

pub use client::{LlmClient, LlmSettings};

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Text,
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub response_format: ResponseFormat,
    pub stage: String,
}

/// Why the provider stopped producing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    /// Content-safety rejection. Deterministic, so never retried.
    Blocked(String),
    Other(String),
}

impl FinishReason {
    pub fn as_str(&self) -> &str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::MaxTokens => "max_tokens",
            FinishReason::Blocked(_) => "blocked",
            FinishReason::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: FinishReason,
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
    fn name(&self) -> &str;
}

/// Builds the configured provider. A missing credential is fatal here so
/// that startup fails before any query is accepted.
pub fn build_provider(config: &Config) -> Result<Arc<dyn Provider>, AppError> {
    match config.llm_provider.as_str() {
        "google" | "gemini" => {
            let api_key = config
                .google_api_key
                .as_deref()
                .ok_or_else(|| AppError::MissingCredential("GOOGLE_API_KEY".to_string()))?;
            let provider = gemini::GeminiProvider::new(api_key, config.llm_timeout())
                .map_err(|e| AppError::Config(format!("{e:#}")))?
                .with_base_url(&config.gemini_base_url);
            Ok(Arc::new(provider))
        }
        "openai" => {
            let api_key = config
                .openai_api_key
                .as_deref()
                .ok_or_else(|| AppError::MissingCredential("OPENAI_API_KEY".to_string()))?;
            Ok(Arc::new(openai::OpenAIProvider::new(api_key)))
        }
        "ollama" => Ok(Arc::new(openai::OpenAIProvider::new_ollama(
            &config.ollama_base_url,
        ))),
        other => Err(AppError::Config(format!(
            "unsupported LLM_PROVIDER {other:?} (expected google, openai or ollama)"
        ))),
    }
}
