#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use business_insights::{Config, QueryPipeline};
use business_insights::llm::{
    FinishReason, GenerateRequest, GenerateResponse, LlmClient, LlmSettings, Provider,
};
use business_insights::models::BusinessProfile;
use business_insights::search::{ContextFetcher, SearchBackend, SearchHit};

pub enum Reply {
    Text(String),
    Finished(String, FinishReason),
    Fail(String),
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Reply::Text(content.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Reply::Fail(message.into())
    }
}

/// Provider that answers each pipeline stage from its own queue and
/// remembers every request it saw.
#[derive(Default)]
pub struct ScriptedProvider {
    classify: Mutex<VecDeque<Reply>>,
    generate: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_classify(self, reply: Reply) -> Self {
        self.classify.lock().unwrap().push_back(reply);
        self
    }

    pub fn on_generate(self, reply: Reply) -> Self {
        self.generate.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self, stage: &str) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.stage == stage)
            .cloned()
            .collect()
    }

    pub fn generation_prompt(&self) -> String {
        self.requests("generate")
            .last()
            .map(|r| r.prompt.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.requests.lock().unwrap().push(req.clone());

        let queue = match req.stage.as_str() {
            "classify" => &self.classify,
            _ => &self.generate,
        };
        let reply = queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::fail("script exhausted"));

        let (content, finish_reason) = match reply {
            Reply::Text(content) => (content, FinishReason::Stop),
            Reply::Finished(content, reason) => (content, reason),
            Reply::Fail(message) => return Err(anyhow::anyhow!(message)),
        };

        Ok(GenerateResponse {
            content,
            model: req.model.clone(),
            input_tokens: 10,
            output_tokens: 20,
            finish_reason,
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Search backend with canned answers per query. Unknown queries get a
/// single hit derived from the query text.
#[derive(Default)]
pub struct CannedSearch {
    answers: HashMap<String, Result<Vec<SearchHit>, String>>,
    seen: Mutex<Vec<String>>,
}

impl CannedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, query: &str) -> Self {
        self.answers
            .insert(query.to_string(), Err(format!("backend down for {query}")));
        self
    }

    pub fn answering(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.answers.insert(query.to_string(), Ok(hits));
        self
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

pub fn hit(title: &str, snippet: &str, url: &str) -> SearchHit {
    SearchHit {
        title: Some(title.to_string()),
        snippet: Some(snippet.to_string()),
        url: Some(url.to_string()),
    }
}

#[async_trait::async_trait]
impl SearchBackend for CannedSearch {
    async fn search(&self, query: &str, _max_results: u32) -> anyhow::Result<Vec<SearchHit>> {
        self.seen.lock().unwrap().push(query.to_string());
        match self.answers.get(query) {
            Some(Ok(hits)) => Ok(hits.clone()),
            Some(Err(message)) => Err(anyhow::anyhow!(message.clone())),
            None => Ok(vec![hit(
                &format!("About {query}"),
                &format!("Snippet for {query}"),
                "https://example.com/result",
            )]),
        }
    }

    fn name(&self) -> &str {
        "canned"
    }
}

pub fn fast_settings() -> LlmSettings {
    LlmSettings {
        retry_base_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        ..LlmSettings::default()
    }
}

/// Configuration that needs no credentials and ignores the process
/// environment.
pub fn test_config() -> Config {
    Config {
        llm_provider: "ollama".to_string(),
        search_provider: "none".to_string(),
        ..Config::default()
    }
}

pub fn pipeline(provider: Arc<ScriptedProvider>, search: Option<Arc<CannedSearch>>) -> QueryPipeline {
    let llm = LlmClient::new(provider, fast_settings());
    let search = match search {
        Some(backend) => ContextFetcher::new(backend, Duration::ZERO),
        None => ContextFetcher::disabled(),
    };
    QueryPipeline::new(llm, search, BusinessProfile::default(), 3, 15)
}
