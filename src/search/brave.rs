use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use super::{SearchBackend, SearchHit};

const DEFAULT_BASE_URL: &str = "https://api.search.brave.com";

pub struct BraveSearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl BraveSearch {
    pub fn new(api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building Brave HTTP client")?;
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

#[derive(Deserialize, Default)]
#[serde(default)]
struct BraveResponse {
    web: Option<BraveWeb>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct BraveWeb {
    results: Vec<BraveResult>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct BraveResult {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

/// Brave highlights matches with `<strong>` tags inside descriptions.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[async_trait::async_trait]
impl SearchBackend for BraveSearch {
    async fn search(&self, query: &str, max_results: u32) -> anyhow::Result<Vec<SearchHit>> {
        let count = max_results.to_string();
        let response = self
            .client
            .get(format!("{}/res/v1/web/search", self.base_url))
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Brave search error ({status}): {body}"));
        }

        let payload: BraveResponse = response.json().await?;

        Ok(payload
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .map(|r| SearchHit {
                title: r.title.as_deref().map(strip_tags),
                snippet: r.description.as_deref().map(strip_tags),
                url: r.url,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "brave"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("The <strong>Acme</strong> pricing page"),
            "The Acme pricing page"
        );
        assert_eq!(strip_tags("no tags"), "no tags");
    }

    #[test]
    fn test_response_without_web_section() {
        let payload: BraveResponse = serde_json::from_str(r#"{"type": "search"}"#).unwrap();
        assert!(payload.web.is_none());
    }
}
