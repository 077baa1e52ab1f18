use axum::{
    Form, Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::error::{AppError, AppResult};

pub const REPORT_FILENAME: &str = "business_insights_report.md";

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub content: String,
}

pub async fn ask(State(state): State<AppState>, Form(form): Form<AskForm>) -> AppResult<Json<Value>> {
    let query = form.query.trim().to_string();
    if query.is_empty() {
        return Err(AppError::Validation("Query cannot be empty.".into()));
    }

    tracing::info!(query = %query, "Received query");

    let pipeline = state.pipeline.clone();
    let response = tokio::spawn(async move { pipeline.process_query(&query).await })
        .await
        .map_err(|e| AppError::Internal(format!("query task failed: {e}")))?;

    Ok(Json(json!({ "response": response })))
}

pub async fn download(Form(form): Form<DownloadForm>) -> AppResult<Response> {
    if form.content.is_empty() {
        return Err(AppError::Validation("No content provided for download.".into()));
    }

    tracing::info!(bytes = form.content.len(), "Serving report download");

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={REPORT_FILENAME}"),
            ),
        ],
        form.content,
    )
        .into_response())
}
