use std::sync::Arc;
use std::time::{Duration, Instant};

use opentelemetry::KeyValue;
use serde_json::Value;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::{FinishReason, GenerateRequest, GenerateResponse, Provider, ResponseFormat};
use crate::config::Config;
use crate::error::{AppError, LlmError};
use crate::telemetry::metrics::{
    GEN_AI_ERROR_COUNT, GEN_AI_OPERATION_DURATION, GEN_AI_RETRY_COUNT, GEN_AI_TOKEN_USAGE,
};

/// Generation parameters fixed at construction.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub analysis_model: String,
    pub generative_model: String,
    pub analysis_temperature: f32,
    pub generation_temperature: f32,
    pub max_output_tokens: u32,
    /// Extra attempts after the first one.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            analysis_model: "gemini-2.0-flash".to_string(),
            generative_model: "gemini-2.0-flash".to_string(),
            analysis_temperature: 0.2,
            generation_temperature: 0.7,
            max_output_tokens: 4096,
            max_retries: 2,
            retry_base_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl LlmSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            analysis_model: config.analysis_model.clone(),
            generative_model: config.generative_model.clone(),
            analysis_temperature: config.analysis_temperature,
            generation_temperature: config.generation_temperature,
            max_output_tokens: config.max_output_tokens,
            max_retries: config.llm_max_retries,
            retry_base_delay: Duration::from_millis(config.llm_retry_base_delay_ms),
            request_timeout: config.llm_timeout(),
        }
    }
}

pub struct LlmClient {
    provider: Arc<dyn Provider>,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn Provider>, settings: LlmSettings) -> Self {
        Self { provider, settings }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let provider = super::build_provider(config)?;
        let settings = LlmSettings::from_config(config);

        tracing::info!(
            provider = provider.name(),
            analysis_model = %settings.analysis_model,
            generative_model = %settings.generative_model,
            "LLM client initialized"
        );

        Ok(Self::new(provider, settings))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    /// Structured mode: asks for JSON at low temperature and parses it.
    pub async fn classify(&self, prompt: &str) -> Result<Value, LlmError> {
        let req = GenerateRequest {
            model: self.settings.analysis_model.clone(),
            prompt: prompt.to_string(),
            temperature: self.settings.analysis_temperature,
            max_tokens: self.settings.max_output_tokens,
            response_format: ResponseFormat::Json,
            stage: "classify".to_string(),
        };

        let resp = self.generate_with_retry(&req).await?;
        let json_str = extract_json(&resp.content);

        match serde_json::from_str::<Value>(&json_str) {
            Ok(value) => {
                tracing::info!("Parsed JSON response from analysis model");
                Ok(value)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    raw_response = %truncate(&resp.content, 2000),
                    "Failed to parse JSON response from analysis model"
                );
                Err(LlmError::MalformedJson {
                    reason: err.to_string(),
                    raw: resp.content,
                })
            }
        }
    }

    /// Free-text mode used for the report body.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let req = GenerateRequest {
            model: self.settings.generative_model.clone(),
            prompt: prompt.to_string(),
            temperature: self.settings.generation_temperature,
            max_tokens: self.settings.max_output_tokens,
            response_format: ResponseFormat::Text,
            stage: "generate".to_string(),
        };

        let resp = self.generate_with_retry(&req).await?;
        tracing::info!(
            response_length = resp.content.len(),
            "Received response from generative model"
        );
        Ok(resp.content)
    }

    pub async fn generate_with_retry(
        &self,
        req: &GenerateRequest,
    ) -> Result<GenerateResponse, LlmError> {
        let attempts = self.settings.max_retries + 1;
        let provider_name = self.provider.name();
        let mut last_error = String::new();

        for attempt in 0..attempts {
            match self.generate_once(req).await {
                Ok(resp) => match &resp.finish_reason {
                    FinishReason::Stop => return Ok(resp),
                    FinishReason::Blocked(reason) => {
                        tracing::error!(
                            attempt = attempt + 1,
                            provider = provider_name,
                            model = %req.model,
                            block_reason = %reason,
                            "Prompt blocked by provider"
                        );
                        return Err(LlmError::Blocked {
                            reason: reason.clone(),
                        });
                    }
                    other => {
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_attempts = attempts,
                            provider = provider_name,
                            model = %req.model,
                            finish_reason = other.as_str(),
                            partial_response = %truncate(&resp.content, 500),
                            "LLM generation stopped prematurely"
                        );
                        last_error = format!("generation stopped: {}", other.as_str());
                    }
                },
                Err(err) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        provider = provider_name,
                        model = %req.model,
                        error = %err,
                        "LLM call failed"
                    );
                    last_error = err.to_string();
                }
            }

            if attempt + 1 < attempts {
                GEN_AI_RETRY_COUNT.add(
                    1,
                    &[
                        KeyValue::new("gen_ai.provider.name", provider_name.to_string()),
                        KeyValue::new("gen_ai.request.model", req.model.clone()),
                    ],
                );
                tracing::info!(
                    next_attempt = attempt + 2,
                    max_attempts = attempts,
                    "Retrying LLM call"
                );

                let delay = self.backoff(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        tracing::error!(
            attempts = attempts,
            provider = provider_name,
            model = %req.model,
            last_error = %last_error,
            "LLM call failed after all attempts"
        );

        Err(LlmError::RetriesExhausted {
            attempts,
            last_error,
        })
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let cap = Duration::from_secs(10);
        let base = self
            .settings
            .retry_base_delay
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(cap)
            .min(cap);
        // 25% jitter to avoid thundering herd
        let jitter_ms = fastrand::u64(0..=base.as_millis() as u64 / 4);
        base + Duration::from_millis(jitter_ms)
    }

    async fn generate_once(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let provider_name = self.provider.name();
        let span_display_name = format!("gen_ai.chat {}", req.model);
        let start = Instant::now();

        let span = tracing::info_span!(
            "gen_ai.chat",
            otel.name = %span_display_name,
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = %provider_name,
            gen_ai.request.model = %req.model,
            gen_ai.request.temperature = req.temperature,
            gen_ai.request.max_tokens = req.max_tokens as i64,
            gen_ai.response.model = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            insights.stage = %req.stage,
            otel.status_code = tracing::field::Empty,
            error.type = tracing::field::Empty,
        );

        span.add_event(
            "gen_ai.user.message",
            vec![KeyValue::new("gen_ai.prompt", truncate(&req.prompt, 1000))],
        );

        let timeout = self.settings.request_timeout;
        let result = match tokio::time::timeout(timeout, self.provider.generate(req))
            .instrument(span.clone())
            .await
        {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "request timed out after {}s",
                timeout.as_secs_f64()
            )),
        };

        let duration = start.elapsed().as_secs_f64();

        match result {
            Ok(resp) => {
                span.record("gen_ai.response.model", resp.model.as_str());
                span.record("gen_ai.usage.input_tokens", resp.input_tokens as i64);
                span.record("gen_ai.usage.output_tokens", resp.output_tokens as i64);
                span.record(
                    "gen_ai.response.finish_reasons",
                    resp.finish_reason.as_str(),
                );

                span.add_event(
                    "gen_ai.assistant.message",
                    vec![KeyValue::new(
                        "gen_ai.completion",
                        truncate(&resp.content, 2000),
                    )],
                );

                let op_kv = KeyValue::new("gen_ai.operation.name", "chat");
                let provider_kv = KeyValue::new("gen_ai.provider.name", provider_name.to_string());
                let model_kv = KeyValue::new("gen_ai.request.model", req.model.clone());

                GEN_AI_TOKEN_USAGE.record(
                    f64::from(resp.input_tokens),
                    &[
                        KeyValue::new("gen_ai.token.type", "input"),
                        op_kv.clone(),
                        provider_kv.clone(),
                        model_kv.clone(),
                    ],
                );
                GEN_AI_TOKEN_USAGE.record(
                    f64::from(resp.output_tokens),
                    &[
                        KeyValue::new("gen_ai.token.type", "output"),
                        op_kv.clone(),
                        provider_kv.clone(),
                        model_kv.clone(),
                    ],
                );
                GEN_AI_OPERATION_DURATION.record(duration, &[op_kv, provider_kv, model_kv]);

                Ok(resp)
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                span.record("error.type", classify_error(&err));

                GEN_AI_ERROR_COUNT.add(
                    1,
                    &[
                        KeyValue::new("gen_ai.provider.name", provider_name.to_string()),
                        KeyValue::new("gen_ai.request.model", req.model.clone()),
                        KeyValue::new("error.type", classify_error(&err)),
                    ],
                );

                Err(err)
            }
        }
    }
}

fn classify_error(err: &anyhow::Error) -> &'static str {
    let msg = err.to_string().to_lowercase();
    if msg.contains("rate limit") || msg.contains("429") {
        "rate_limit"
    } else if msg.contains("timeout") || msg.contains("timed out") || msg.contains("deadline") {
        "timeout"
    } else if msg.contains("401")
        || msg.contains("403")
        || msg.contains("auth")
        || msg.contains("api key")
    {
        "auth_error"
    } else if msg.contains("400") || msg.contains("422") || msg.contains("invalid") {
        "invalid_request"
    } else if msg.contains("500")
        || msg.contains("502")
        || msg.contains("503")
        || msg.contains("server")
    {
        "server_error"
    } else if msg.contains("connect")
        || msg.contains("dns")
        || msg.contains("network")
        || msg.contains("reset")
    {
        "network_error"
    } else {
        "unknown_error"
    }
}

/// Strips code-fence markup and surrounding chatter from a JSON answer.
pub(crate) fn extract_json(content: &str) -> String {
    if let Some(start) = content.find("```json")
        && let Some(end) = content[start + 7..].find("```")
    {
        return content[start + 7..start + 7 + end].trim().to_string();
    }
    if let Some(start) = content.find("```")
        && let Some(end) = content[start + 3..].find("```")
    {
        let inner = content[start + 3..start + 3 + end].trim();
        if inner.starts_with('{') {
            return inner.to_string();
        }
    }
    if let Some(start) = content.find('{')
        && let Some(end) = content.rfind('}')
        && start < end
    {
        return content[start..=end].to_string();
    }
    content.trim().to_string()
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.char_indices()
            .take_while(|&(i, c)| i + c.len_utf8() <= max)
            .map(|(_, c)| c)
            .collect()
    }
}
