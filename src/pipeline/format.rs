use crate::error::LlmError;
use crate::models::QueryType;

pub const NO_RESPONSE: &str = "Error: Received no response from the AI generation model.";

pub const DISCLAIMER: &str = "*Disclaimer: This report is AI-generated based on provided context and publicly available data (as of the time of the search). Verify critical information before making decisions.*";

/// Builds the user-facing Markdown report. Generation failures and empty
/// output get their own error shapes with no title or footer.
pub fn format_response(
    generated: Result<&str, &LlmError>,
    query_type: QueryType,
    analysis_error: Option<&str>,
) -> String {
    let text = match generated {
        Err(err) => {
            return format!("An error occurred during response generation:\nError: {err}");
        }
        Ok(text) if text.trim().is_empty() => return NO_RESPONSE.to_string(),
        Ok(text) => text,
    };

    let mut report = format!("# AI Business Insight Report: {}\n\n", query_type.title());

    if let Some(error) = analysis_error {
        report.push_str(&format!(
            "**Warning:** There was an issue during the initial query analysis ({error}). \
             The following response is based on default assumptions or potentially incomplete context.\n\n---\n\n"
        ));
    }

    report.push_str(text);
    report.push_str("\n\n---\n");
    report.push_str(DISCLAIMER);
    report
}
