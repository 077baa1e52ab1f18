use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.config.otel_service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "llm_provider": state.pipeline.provider_name(),
        "company": state.pipeline.profile().company_name,
    }))
}
