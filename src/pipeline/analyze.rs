use chrono::NaiveDate;
use opentelemetry::KeyValue;
use serde_json::Value;

use crate::llm::LlmClient;
use crate::models::{BusinessProfile, Entities, QueryAnalysis, QueryType};
use crate::prompts::query_analysis_prompt;
use crate::telemetry::metrics::ANALYSIS_FALLBACK_COUNT;

#[tracing::instrument(
    name = "pipeline_stage analyze",
    skip(llm, profile, query),
    fields(
        pipeline.stage = "analyze",
        analysis.query_type,
        analysis.searches_planned,
        analysis.fallback,
    )
)]
pub async fn analyze_query(
    llm: &LlmClient,
    profile: &BusinessProfile,
    query: &str,
    today: NaiveDate,
    max_searches: usize,
) -> QueryAnalysis {
    let prompt = query_analysis_prompt(query, profile, today);

    let analysis = match llm.classify(&prompt).await {
        Ok(value) => match parse_analysis(&value, query, max_searches) {
            Ok(analysis) => analysis,
            Err(cause) => fallback(query, &cause),
        },
        Err(err) => fallback(query, &err.to_string()),
    };

    let span = tracing::Span::current();
    span.record("analysis.query_type", analysis.query_type.as_str());
    span.record("analysis.searches_planned", analysis.required_searches.len());
    span.record("analysis.fallback", analysis.error.is_some());

    analysis
}

fn fallback(query: &str, cause: &str) -> QueryAnalysis {
    tracing::warn!(cause = %cause, "Query analysis failed, using generic handling");
    ANALYSIS_FALLBACK_COUNT.add(1, &[]);
    QueryAnalysis::fallback(
        query,
        format!("LLM analysis failed ({cause}), proceeding with generic handling."),
    )
}

/// Turns the model's JSON into a `QueryAnalysis`. The error string names
/// why the payload could not be trusted.
fn parse_analysis(
    value: &Value,
    query: &str,
    max_searches: usize,
) -> Result<QueryAnalysis, String> {
    let Some(object) = value.as_object() else {
        return Err("response was not a JSON object".to_string());
    };

    if let Some(error) = object.get("error").filter(|e| !e.is_null()) {
        let reason = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(reason);
    }

    let query_type = match object.get("query_type").and_then(Value::as_str) {
        Some(tag) => QueryType::from_tag(tag),
        None => return Err("missing query_type".to_string()),
    };

    let mut entities = object
        .get("entities")
        .map(Entities::from_value)
        .unwrap_or_default();
    if entities.original_query.is_none() {
        entities.original_query = Some(query.to_string());
    }

    let required_searches = object
        .get("required_searches")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .take(max_searches)
                .collect()
        })
        .unwrap_or_default();

    tracing::info!(
        query_type = query_type.as_str(),
        searches = ?required_searches,
        "Query analysis complete"
    );

    Ok(QueryAnalysis {
        query_type,
        entities,
        required_searches,
        error: None,
    })
}
