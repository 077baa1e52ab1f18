pub mod health;
pub mod insights;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/ask", post(insights::ask))
        .route("/download", post(insights::download))
        .with_state(state)
}
