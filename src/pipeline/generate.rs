use crate::error::LlmError;
use crate::llm::LlmClient;
use crate::models::QueryType;
use crate::prompts::{PromptContext, render_report_prompt};

#[tracing::instrument(
    name = "pipeline_stage generate",
    skip(llm, ctx),
    fields(
        pipeline.stage = "generate",
        report.query_type = %query_type,
        prompt.chars,
        response.chars,
    )
)]
pub async fn generate_report(
    llm: &LlmClient,
    query_type: QueryType,
    ctx: &PromptContext<'_>,
) -> Result<String, LlmError> {
    let prompt = render_report_prompt(query_type, ctx);

    let span = tracing::Span::current();
    span.record("prompt.chars", prompt.len());
    tracing::info!(
        template = query_type.as_str(),
        "Generating final response"
    );

    let text = llm.generate(&prompt).await?;
    span.record("response.chars", text.len());
    Ok(text)
}
