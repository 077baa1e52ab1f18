pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod routes;
pub mod search;
pub mod telemetry;

use std::sync::Arc;

pub use config::Config;
pub use pipeline::QueryPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QueryPipeline>,
    pub config: Config,
}
