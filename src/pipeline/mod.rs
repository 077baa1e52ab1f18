pub mod analyze;
pub mod format;
pub mod generate;
pub mod orchestrator;
pub mod retrieve;

pub use format::{DISCLAIMER, NO_RESPONSE, format_response};
pub use orchestrator::QueryPipeline;
