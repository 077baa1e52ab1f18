use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub llm_provider: String,
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_base_url: String,
    pub ollama_base_url: String,
    pub analysis_model: String,
    pub generative_model: String,
    pub analysis_temperature: f32,
    pub generation_temperature: f32,
    pub max_output_tokens: u32,
    pub llm_max_retries: u32,
    pub llm_retry_base_delay_ms: u64,
    pub llm_timeout_secs: u64,
    pub search_provider: String,
    pub brave_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    pub search_results_per_query: u32,
    pub search_delay_ms: u64,
    pub search_timeout_secs: u64,
    pub max_search_queries: usize,
    pub business_profile_path: Option<String>,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            environment: "development".to_string(),
            llm_provider: "google".to_string(),
            google_api_key: None,
            openai_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            analysis_model: "gemini-2.0-flash".to_string(),
            generative_model: "gemini-2.0-flash".to_string(),
            analysis_temperature: 0.2,
            generation_temperature: 0.7,
            max_output_tokens: 4096,
            llm_max_retries: 2,
            llm_retry_base_delay_ms: 1000,
            llm_timeout_secs: 120,
            search_provider: "brave".to_string(),
            brave_api_key: None,
            tavily_api_key: None,
            search_results_per_query: 3,
            search_delay_ms: 500,
            search_timeout_secs: 15,
            max_search_queries: 15,
            business_profile_path: None,
            otel_service_name: "business-insights".to_string(),
            otel_exporter_endpoint: "http://localhost:4317".to_string(),
        }
    }
}

impl Config {
    /// Environment overrides on top of `Config::default()`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let d = Self::default();

        Ok(Self {
            port: parsed("APP_PORT", d.port)?,
            environment: env::var("ENVIRONMENT").unwrap_or(d.environment),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or(d.llm_provider),
            google_api_key: non_empty("GOOGLE_API_KEY"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            gemini_base_url: env::var("GEMINI_BASE_URL").unwrap_or(d.gemini_base_url),
            ollama_base_url: env::var("OLLAMA_BASE_URL").unwrap_or(d.ollama_base_url),
            analysis_model: env::var("LLM_ANALYSIS_MODEL").unwrap_or(d.analysis_model),
            generative_model: env::var("LLM_GENERATIVE_MODEL").unwrap_or(d.generative_model),
            analysis_temperature: parsed("ANALYSIS_TEMPERATURE", d.analysis_temperature)?,
            generation_temperature: parsed("GENERATION_TEMPERATURE", d.generation_temperature)?,
            max_output_tokens: parsed("MAX_OUTPUT_TOKENS", d.max_output_tokens)?,
            llm_max_retries: parsed("LLM_MAX_RETRIES", d.llm_max_retries)?,
            llm_retry_base_delay_ms: parsed("LLM_RETRY_BASE_DELAY_MS", d.llm_retry_base_delay_ms)?,
            llm_timeout_secs: parsed("LLM_TIMEOUT_SECS", d.llm_timeout_secs)?,
            search_provider: env::var("SEARCH_PROVIDER").unwrap_or(d.search_provider),
            brave_api_key: non_empty("BRAVE_API_KEY"),
            tavily_api_key: non_empty("TAVILY_API_KEY"),
            search_results_per_query: parsed("SEARCH_RESULTS_PER_QUERY", d.search_results_per_query)?,
            search_delay_ms: parsed("SEARCH_DELAY_MS", d.search_delay_ms)?,
            search_timeout_secs: parsed("SEARCH_TIMEOUT_SECS", d.search_timeout_secs)?,
            max_search_queries: parsed("MAX_SEARCH_QUERIES", d.max_search_queries)?,
            business_profile_path: non_empty("BUSINESS_PROFILE_PATH"),
            otel_service_name: env::var("OTEL_SERVICE_NAME").unwrap_or(d.otel_service_name),
            otel_exporter_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or(d.otel_exporter_endpoint),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_uses_default_when_unset() {
        let value: u32 = parsed("INSIGHTS_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_default_matches_documented_values() {
        let config = Config::default();
        assert_eq!(config.llm_provider, "google");
        assert_eq!(config.llm_max_retries, 2);
        assert_eq!(config.max_search_queries, 15);
        assert_eq!(config.llm_timeout(), Duration::from_secs(120));
        assert!(config.google_api_key.is_none());
    }

    #[test]
    fn test_non_empty_ignores_missing() {
        assert_eq!(non_empty("INSIGHTS_TEST_UNSET_VARIABLE"), None);
    }
}
