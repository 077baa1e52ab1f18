use std::time::Instant;

use chrono::NaiveDate;
use opentelemetry::KeyValue;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::llm::LlmClient;
use crate::models::BusinessProfile;
use crate::prompts::PromptContext;
use crate::search::ContextFetcher;
use crate::telemetry::metrics::{QUERY_COUNT, QUERY_DURATION};

use super::{analyze, format, generate, retrieve};

/// Turns one free-form question into a Markdown report. Holds no per-call
/// mutable state, so a single instance can serve concurrent requests.
pub struct QueryPipeline {
    llm: LlmClient,
    search: ContextFetcher,
    profile: BusinessProfile,
    results_per_query: u32,
    max_search_queries: usize,
}

impl QueryPipeline {
    pub fn new(
        llm: LlmClient,
        search: ContextFetcher,
        profile: BusinessProfile,
        results_per_query: u32,
        max_search_queries: usize,
    ) -> Self {
        Self {
            llm,
            search,
            profile,
            results_per_query,
            max_search_queries,
        }
    }

    /// Fails only on construction-time problems such as a missing
    /// credential or an unreadable profile file.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let llm = LlmClient::from_config(config)?;
        let search = ContextFetcher::from_config(config);
        let profile = BusinessProfile::load(config.business_profile_path.as_deref())
            .map_err(|e| AppError::Config(format!("{e:#}")))?;

        tracing::info!(
            company = %profile.company_name,
            search_enabled = search.is_enabled(),
            "Query pipeline initialized"
        );

        Ok(Self::new(
            llm,
            search,
            profile,
            config.search_results_per_query,
            config.max_search_queries,
        ))
    }

    pub fn profile(&self) -> &BusinessProfile {
        &self.profile
    }

    pub fn provider_name(&self) -> &str {
        self.llm.provider_name()
    }

    pub async fn process_query(&self, query: &str) -> String {
        self.process_query_on(query, chrono::Local::now().date_naive())
            .await
    }

    /// `process_query` with the reference date supplied by the caller.
    #[tracing::instrument(
        name = "pipeline query",
        skip(self, query),
        fields(
            query.id = %Uuid::new_v4(),
            query.chars = query.len(),
            query.kind,
            query.searches,
            query.duration_ms,
        )
    )]
    pub async fn process_query_on(&self, query: &str, today: NaiveDate) -> String {
        let start = Instant::now();
        tracing::info!(query = %query, "Processing query");

        let analysis = analyze::analyze_query(
            &self.llm,
            &self.profile,
            query,
            today,
            self.max_search_queries,
        )
        .await;

        let span = tracing::Span::current();
        span.record("query.kind", analysis.query_type.as_str());
        span.record("query.searches", analysis.required_searches.len());

        let search_context = retrieve::retrieve_context(
            &self.search,
            &analysis.required_searches,
            self.results_per_query,
        )
        .await;

        let ctx = PromptContext {
            profile: &self.profile,
            entities: &analysis.entities,
            search_context: &search_context,
            original_query: query,
            today,
        };
        let generated = generate::generate_report(&self.llm, analysis.query_type, &ctx).await;

        let outcome = match &generated {
            Ok(text) if text.trim().is_empty() => "empty",
            Ok(_) => "ok",
            Err(_) => "error",
        };
        if let Err(err) = &generated {
            tracing::error!(error = %err, "Response generation failed");
        }

        let report = format::format_response(
            generated.as_deref(),
            analysis.query_type,
            analysis.error.as_deref(),
        );

        let elapsed = start.elapsed();
        span.record("query.duration_ms", elapsed.as_millis() as u64);
        let attrs = [
            KeyValue::new("query.type", analysis.query_type.as_str()),
            KeyValue::new("query.outcome", outcome),
            KeyValue::new("query.fallback", analysis.error.is_some()),
        ];
        QUERY_COUNT.add(1, &attrs);
        QUERY_DURATION.record(elapsed.as_secs_f64(), &attrs);

        tracing::info!(
            duration_ms = elapsed.as_millis() as u64,
            outcome,
            report_chars = report.len(),
            "Query processed"
        );

        report
    }
}
