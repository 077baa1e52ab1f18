mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;

use business_insights::llm::FinishReason;
use business_insights::pipeline::{DISCLAIMER, NO_RESPONSE};
use business_insights::prompts::persona_header;

use common::{CannedSearch, Reply, ScriptedProvider, hit, pipeline};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn classification(query_type: &str, searches: &[&str]) -> Reply {
    Reply::text(
        json!({
            "query_type": query_type,
            "entities": {},
            "required_searches": searches,
        })
        .to_string(),
    )
}

#[tokio::test]
async fn test_competitive_query_end_to_end() {
    let query = "Compare us to Acme Corp and Beta Solutions on pricing";
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_classify(Reply::text(format!(
                "```json\n{}\n```",
                json!({
                    "query_type": "competitive_analysis",
                    "entities": {
                        "competitors": ["Acme Corp", "Beta Solutions"],
                        "focus_areas": ["pricing"]
                    },
                    "required_searches": ["Acme Corp pricing 2026", "Beta Solutions pricing 2026"]
                })
            )))
            .on_generate(Reply::text("Detailed comparison...")),
    );
    let search = Arc::new(
        CannedSearch::new()
            .answering(
                "Acme Corp pricing 2026",
                vec![hit("Acme pricing", "Acme charges $99 per seat.", "https://acme.example/pricing")],
            )
            .answering(
                "Beta Solutions pricing 2026",
                vec![hit("Beta plans", "Beta starts at $49.", "https://beta.example/plans")],
            ),
    );

    let report = pipeline(provider.clone(), Some(search.clone()))
        .process_query_on(query, today())
        .await;

    assert!(report.starts_with("# AI Business Insight Report: Competitive Analysis\n\n"));
    assert!(report.contains("Detailed comparison..."));
    assert!(report.ends_with(DISCLAIMER));
    assert!(!report.contains("**Warning:**"));

    assert_eq!(
        search.seen(),
        vec!["Acme Corp pricing 2026", "Beta Solutions pricing 2026"]
    );

    let prompt = provider.generation_prompt();
    assert!(prompt.starts_with(&persona_header(today())));
    assert!(prompt.contains(&format!("**User Query:** \"{query}\"")));
    assert!(prompt.contains("**Competitors Identified:** Acme Corp, Beta Solutions\n"));
    assert!(prompt.contains("**Specific Focus Areas:** pricing\n"));
    assert!(prompt.contains("--- Search Results for 'Acme Corp pricing 2026' ---"));
    assert!(prompt.contains("Snippet: Beta starts at $49."));

    let classify = provider.requests("classify");
    assert_eq!(classify.len(), 1);
    assert!(classify[0].prompt.contains(&format!("\"{query}\"")));
    assert!((classify[0].temperature - 0.2).abs() < f32::EPSILON);
    assert!((provider.requests("generate")[0].temperature - 0.7).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_every_query_type_selects_its_template() {
    let cases = [
        ("competitive_analysis", "Competitive Analysis", "**Competitors Identified:**"),
        ("trend_forecasting", "Trend Forecasting", "**Time Horizon:** next 1-3 years"),
        ("swot_analysis", "Swot Analysis", "**Focus of SWOT:**"),
        ("marketing_strategy", "Marketing Strategy", "**Planning Horizon:**"),
        ("financial_analysis", "Financial Analysis", "**Key Metrics:**"),
        ("generic", "Generic", "1.  **Deconstruct the Query:**"),
        ("generic_business_question", "Generic", "1.  **Deconstruct the Query:**"),
        ("operational_efficiency", "Generic", "1.  **Deconstruct the Query:**"),
    ];

    for (tag, title, marker) in cases {
        let provider = Arc::new(
            ScriptedProvider::new()
                .on_classify(classification(tag, &[]))
                .on_generate(Reply::text("Body")),
        );

        let report = pipeline(provider.clone(), None)
            .process_query_on("How should we plan?", today())
            .await;

        assert!(
            report.starts_with(&format!("# AI Business Insight Report: {title}\n\n")),
            "{tag}: {report}"
        );
        let prompt = provider.generation_prompt();
        assert!(prompt.contains(marker), "{tag} did not use its template");
    }
}

#[tokio::test]
async fn test_classification_failure_falls_back_to_generic() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_classify(Reply::fail("connection reset"))
            .on_classify(Reply::fail("connection reset"))
            .on_classify(Reply::fail("connection reset"))
            .on_generate(Reply::text("General advice.")),
    );
    let search = Arc::new(CannedSearch::new());

    let report = pipeline(provider.clone(), Some(search.clone()))
        .process_query_on("What should we do next year?", today())
        .await;

    assert_eq!(provider.requests("classify").len(), 3);
    assert!(search.seen().is_empty());
    assert!(report.starts_with(
        "# AI Business Insight Report: Generic\n\n**Warning:** There was an issue during the initial query analysis (LLM analysis failed (Failed to get response from the model after 3 attempts.), proceeding with generic handling.)."
    ));
    assert!(report.contains("General advice."));
    assert!(report.ends_with(DISCLAIMER));
}

#[tokio::test]
async fn test_invalid_classification_json_falls_back() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_classify(Reply::text("I think this is a competitive question."))
            .on_generate(Reply::text("Answer.")),
    );

    let report = pipeline(provider.clone(), None)
        .process_query_on("Who are our rivals?", today())
        .await;

    assert_eq!(provider.requests("classify").len(), 1);
    assert!(report.starts_with("# AI Business Insight Report: Generic\n\n**Warning:**"));
    assert!(report.contains("Failed to parse analysis response"));
    assert!(provider.generation_prompt().contains("1.  **Deconstruct the Query:**"));
}

#[tokio::test]
async fn test_classification_without_query_type_falls_back() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_classify(Reply::text(r#"{"entities": {}, "required_searches": ["x"]}"#))
            .on_generate(Reply::text("Answer.")),
    );
    let search = Arc::new(CannedSearch::new());

    let report = pipeline(provider, Some(search.clone()))
        .process_query_on("Anything?", today())
        .await;

    assert!(report.contains("(LLM analysis failed (missing query_type), proceeding with generic handling.)"));
    assert!(search.seen().is_empty());
}

#[tokio::test]
async fn test_empty_generation_returns_no_response() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_classify(classification("swot_analysis", &[]))
            .on_generate(Reply::text("")),
    );

    let report = pipeline(provider.clone(), None)
        .process_query_on("Run a SWOT", today())
        .await;

    assert_eq!(report, NO_RESPONSE);
    assert_eq!(provider.requests("generate").len(), 1);
}

#[tokio::test]
async fn test_generation_failure_returns_error_report() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_classify(classification("trend_forecasting", &[]))
            .on_generate(Reply::fail("503"))
            .on_generate(Reply::Finished("partial".into(), FinishReason::MaxTokens))
            .on_generate(Reply::fail("503")),
    );

    let report = pipeline(provider.clone(), None)
        .process_query_on("Where is the market going?", today())
        .await;

    assert_eq!(
        report,
        "An error occurred during response generation:\nError: Failed to get response from the model after 3 attempts."
    );
    assert_eq!(provider.requests("generate").len(), 3);
}

#[tokio::test]
async fn test_generation_recovers_on_third_attempt() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_classify(classification("generic", &[]))
            .on_generate(Reply::fail("timeout"))
            .on_generate(Reply::fail("timeout"))
            .on_generate(Reply::text("Third time lucky.")),
    );

    let report = pipeline(provider, None)
        .process_query_on("Help?", today())
        .await;

    assert!(report.contains("Third time lucky."));
    assert!(report.ends_with(DISCLAIMER));
}

#[tokio::test]
async fn test_blocked_generation_is_not_retried() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_classify(classification("generic", &[]))
            .on_generate(Reply::Finished(String::new(), FinishReason::Blocked("SAFETY".into()))),
    );

    let report = pipeline(provider.clone(), None)
        .process_query_on("Something unsafe", today())
        .await;

    assert_eq!(
        report,
        "An error occurred during response generation:\nError: Prompt blocked - SAFETY"
    );
    assert_eq!(provider.requests("generate").len(), 1);
}

#[tokio::test]
async fn test_search_failure_is_isolated_per_query() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_classify(classification("generic", &["first", "second", "third"]))
            .on_generate(Reply::text("Done.")),
    );
    let search = Arc::new(CannedSearch::new().failing("second"));

    let report = pipeline(provider.clone(), Some(search.clone()))
        .process_query_on("Tell me about the market", today())
        .await;

    assert!(report.contains("Done."));
    assert_eq!(search.seen(), vec!["first", "second", "third"]);

    let prompt = provider.generation_prompt();
    let first = prompt.find("--- Search Results for 'first' ---").unwrap();
    let second = prompt.find("--- Error searching for query: 'second' ---").unwrap();
    let third = prompt.find("--- Search Results for 'third' ---").unwrap();
    assert!(first < second && second < third);
}

#[tokio::test]
async fn test_disabled_search_leaves_context_empty() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_classify(classification("competitive_analysis", &["a", "b"]))
            .on_generate(Reply::text("Report.")),
    );

    let report = pipeline(provider.clone(), None)
        .process_query_on("Compare us", today())
        .await;

    assert!(report.contains("Report."));
    assert!(provider.generation_prompt().contains(
        "**Recent Information Context (from web searches):**\nNo specific real-time data was fetched or available for this query.\n"
    ));
}

#[tokio::test]
async fn test_prompt_date_follows_reference_day() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_classify(classification("generic", &[]))
            .on_generate(Reply::text("x")),
    );
    let later = NaiveDate::from_ymd_opt(2027, 1, 2).unwrap();

    pipeline(provider.clone(), None)
        .process_query_on("When?", later)
        .await;

    assert!(provider.generation_prompt().contains("Today's date is January 2, 2027;"));
    assert!(provider.requests("classify")[0].prompt.contains("Today's date is 2027-01-02."));
}
