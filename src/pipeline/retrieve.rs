use crate::search::ContextFetcher;

#[tracing::instrument(
    name = "pipeline_stage retrieve",
    skip(search, queries),
    fields(
        pipeline.stage = "retrieve",
        retrieve.queries = queries.len(),
        retrieve.context_chars,
    )
)]
pub async fn retrieve_context(
    search: &ContextFetcher,
    queries: &[String],
    results_per_query: u32,
) -> String {
    let context = search.fetch(queries, results_per_query).await;
    tracing::Span::current().record("retrieve.context_chars", context.len());
    context
}
