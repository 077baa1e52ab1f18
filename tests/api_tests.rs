mod common;

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

use business_insights::{AppState, routes};

use common::{Reply, ScriptedProvider, pipeline, test_config};

fn app(provider: ScriptedProvider) -> axum::Router {
    let state = AppState {
        pipeline: Arc::new(pipeline(Arc::new(provider), None)),
        config: test_config(),
    };
    routes::create_router(state)
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ask_returns_report() {
    let provider = ScriptedProvider::new()
        .on_classify(Reply::text(r#"{"query_type": "swot_analysis", "required_searches": []}"#))
        .on_generate(Reply::text("Strengths and weaknesses."));

    let response = app(provider)
        .oneshot(form("/ask", "query=Run+a+SWOT+for+us"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let report = body["response"].as_str().unwrap();
    assert!(report.starts_with("# AI Business Insight Report: Swot Analysis"));
    assert!(report.contains("Strengths and weaknesses."));
}

#[tokio::test]
async fn test_ask_rejects_blank_query() {
    let response = app(ScriptedProvider::new())
        .oneshot(form("/ask", "query=+++"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Query cannot be empty.");
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_ask_rejects_missing_field() {
    let response = app(ScriptedProvider::new())
        .oneshot(form("/ask", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_returns_markdown_attachment() {
    let response = app(ScriptedProvider::new())
        .oneshot(form("/download", "content=%23+Report%0ABody"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=business_insights_report.md"
    );
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/markdown")
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"# Report\nBody");
}

#[tokio::test]
async fn test_download_rejects_empty_content() {
    let response = app(ScriptedProvider::new())
        .oneshot(form("/download", "content="))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "No content provided for download.");
}

#[tokio::test]
async fn test_health() {
    let response = app(ScriptedProvider::new())
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["llm_provider"], "scripted");
    assert_eq!(body["company"], "Setu");
}
