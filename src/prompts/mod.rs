//! Prompt construction. Every function here is pure: the same inputs
//! (including `today`) always yield the same text.

mod analysis;
mod templates;

use chrono::NaiveDate;

use crate::models::{BusinessProfile, Entities, QueryType};

pub use analysis::query_analysis_prompt;

pub const OUTPUT_FORMAT_REQUIREMENT: &str = "Structure your response logically as a business report. Use clear headings for each section. Use Markdown for clarity (e.g., tables for direct comparisons where suitable, lists, bold text). Conclude with a dedicated 'Actionable Recommendations' section, suggesting concrete next steps, potential KPIs to track, and considerations for implementation within a mid-size company context.";

/// Everything a report template may draw on.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub profile: &'a BusinessProfile,
    pub entities: &'a Entities,
    pub search_context: &'a str,
    pub original_query: &'a str,
    pub today: NaiveDate,
}

/// The persona header shared by all report prompts, dated `today`.
pub fn persona_header(today: NaiveDate) -> String {
    format!(
        "You are 'Strategos', an advanced AI Business Insights Assistant specialized in providing strategic analysis and actionable recommendations for mid-size enterprises (approx. 200-1000 employees). Today's date is {}; treat it as the reference point for anything described as current, recent or upcoming. Your analysis must be deep, context-aware, data-informed (using provided search results), and clearly structured. Assume the user is a decision-maker (CEO, Director, Head of Department) looking for practical insights, not just generic information. Use Markdown extensively for formatting (headings, lists, tables, bold text).",
        today.format("%B %-d, %Y")
    )
}

/// Selects the template for `query_type` and renders it.
pub fn render_report_prompt(query_type: QueryType, ctx: &PromptContext<'_>) -> String {
    match query_type {
        QueryType::CompetitiveAnalysis => templates::competitive_analysis(ctx),
        QueryType::TrendForecasting => templates::trend_forecasting(ctx),
        QueryType::SwotAnalysis => templates::swot_analysis(ctx),
        QueryType::MarketingStrategy => templates::marketing_strategy(ctx),
        QueryType::FinancialAnalysis => templates::financial_analysis(ctx),
        QueryType::Generic => templates::generic(ctx),
    }
}
