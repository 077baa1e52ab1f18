pub mod brave;
pub mod tavily;

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::KeyValue;

use crate::config::Config;
use crate::telemetry::metrics::{SEARCH_ERROR_COUNT, SEARCH_QUERY_COUNT};

/// One ranked web result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHit {
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub url: Option<String>,
}

#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> anyhow::Result<Vec<SearchHit>>;
    fn name(&self) -> &str;
}

/// Runs planned searches and renders them into a single context blob.
/// Without a backend every fetch is a successful no-op.
pub struct ContextFetcher {
    backend: Option<Arc<dyn SearchBackend>>,
    delay: Duration,
}

impl ContextFetcher {
    pub fn new(backend: Arc<dyn SearchBackend>, delay: Duration) -> Self {
        Self {
            backend: Some(backend),
            delay,
        }
    }

    pub fn disabled() -> Self {
        Self {
            backend: None,
            delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        match build_backend(config) {
            Some(backend) => {
                tracing::info!(backend = backend.name(), "Web search enabled");
                Self::new(backend, Duration::from_millis(config.search_delay_ms))
            }
            None => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    #[tracing::instrument(
        name = "search fetch",
        skip(self, queries),
        fields(search.queries = queries.len(), search.failures)
    )]
    pub async fn fetch(&self, queries: &[String], results_per_query: u32) -> String {
        let Some(backend) = self.backend.as_ref() else {
            tracing::info!("Search disabled, skipping context retrieval");
            return String::new();
        };
        if queries.is_empty() {
            tracing::info!("No search queries planned");
            return String::new();
        }

        tracing::info!(count = queries.len(), "Fetching real-time data");

        let mut blocks = Vec::with_capacity(queries.len());
        let mut failures = 0usize;

        for (i, query) in queries.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            SEARCH_QUERY_COUNT.add(1, &[KeyValue::new("search.backend", backend.name().to_string())]);
            tracing::info!(query = %query, "Searching");

            match backend.search(query, results_per_query).await {
                Ok(hits) if hits.is_empty() => {
                    tracing::info!(query = %query, "No results found");
                    blocks.push(no_results_block(query));
                }
                Ok(mut hits) => {
                    hits.truncate(results_per_query as usize);
                    blocks.push(results_block(query, &hits));
                }
                Err(err) => {
                    failures += 1;
                    SEARCH_ERROR_COUNT.add(
                        1,
                        &[KeyValue::new("search.backend", backend.name().to_string())],
                    );
                    tracing::error!(query = %query, error = %err, "Search failed");
                    blocks.push(error_block(query));
                }
            }
        }

        tracing::Span::current().record("search.failures", failures);
        tracing::info!(blocks = blocks.len(), failures, "Finished fetching search data");

        blocks.join("\n\n")
    }
}

fn build_backend(config: &Config) -> Option<Arc<dyn SearchBackend>> {
    let timeout = config.search_timeout();
    match config.search_provider.as_str() {
        "brave" => match config.brave_api_key.as_deref() {
            Some(key) => enabled(brave::BraveSearch::new(key, timeout)),
            None => {
                tracing::warn!("BRAVE_API_KEY not set, real-time search is disabled");
                None
            }
        },
        "tavily" => match config.tavily_api_key.as_deref() {
            Some(key) => enabled(tavily::TavilySearch::new(key, timeout)),
            None => {
                tracing::warn!("TAVILY_API_KEY not set, real-time search is disabled");
                None
            }
        },
        "none" | "" => None,
        other => {
            tracing::warn!(provider = %other, "Unknown SEARCH_PROVIDER, real-time search is disabled");
            None
        }
    }
}

fn enabled<B: SearchBackend + 'static>(
    backend: anyhow::Result<B>,
) -> Option<Arc<dyn SearchBackend>> {
    match backend {
        Ok(backend) => Some(Arc::new(backend)),
        Err(err) => {
            tracing::warn!(error = %err, "Search client unavailable, real-time search is disabled");
            None
        }
    }
}

fn or_na(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => "N/A",
    }
}

pub(crate) fn results_block(query: &str, hits: &[SearchHit]) -> String {
    let mut parts = Vec::with_capacity(hits.len() + 2);
    parts.push(format!("--- Search Results for '{query}' ---"));
    for (i, hit) in hits.iter().enumerate() {
        parts.push(format!(
            "{}. Title: {}\n   Snippet: {}\n   Source: {}",
            i + 1,
            or_na(&hit.title),
            or_na(&hit.snippet),
            or_na(&hit.url),
        ));
    }
    parts.push("--- End of Results ---".to_string());
    parts.join("\n\n")
}

pub(crate) fn no_results_block(query: &str) -> String {
    format!("--- No significant results found online for query: '{query}' ---")
}

pub(crate) fn error_block(query: &str) -> String {
    format!("--- Error searching for query: '{query}' ---")
}
