use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;

use super::{SearchBackend, SearchHit};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TavilySearch {
    pub fn new(api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building Tavily HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TavilyResult {
    title: Option<String>,
    content: Option<String>,
    url: Option<String>,
}

#[async_trait::async_trait]
impl SearchBackend for TavilySearch {
    async fn search(&self, query: &str, max_results: u32) -> anyhow::Result<Vec<SearchHit>> {
        let body = json!({
            "query": query,
            "search_depth": "basic",
            "max_results": max_results,
            "include_answer": false,
            "include_raw_content": false
        });

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Tavily search error ({status}): {body}"));
        }

        let payload: TavilyResponse = response.json().await?;

        Ok(payload
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                snippet: r.content,
                url: r.url,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
