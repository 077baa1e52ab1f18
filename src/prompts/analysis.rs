use chrono::{Datelike, NaiveDate};

use crate::models::BusinessProfile;

/// Classification prompt: asks for query type, entities and planned
/// searches as a single JSON object.
pub fn query_analysis_prompt(query: &str, profile: &BusinessProfile, today: NaiveDate) -> String {
    let profile_json = serde_json::to_string_pretty(profile).unwrap_or_default();
    let year = today.year();

    format!(
        r#"Analyze the following user query submitted to an AI Business Insights Assistant.
Your goal is to understand the user's intent, identify key entities, and determine what *current, publicly available information* needs to be searched online to provide the best possible answer. Today's date is {today}.

**Business Context:**
The assistant serves a mid-size enterprise with the following profile:
{profile_json}

**User Query:**
"{query}"

**Your Task:**
Respond ONLY with a JSON object containing the following keys:
1.  `query_type`: (String) Classify the primary intent. Choose ONE from: "competitive_analysis", "trend_forecasting", "swot_analysis", "market_research", "marketing_strategy", "financial_analysis", "operational_efficiency", "generic", "other".
2.  `entities`: (Object) Extract key entities mentioned or implied. Include keys like:
    * `competitors`: (List of strings) Specific competitor names.
    * `industry`: (String) Target industry, if specified or implied. Default to business profile if relevant.
    * `products_services`: (List of strings) Specific products/services mentioned.
    * `geography`: (String) Geographic focus, if any.
    * `time_horizon`: (String) e.g., "next quarter", "1-3 years", "long-term".
    * `focus_areas`: (List of strings) Specific aspects to analyze (e.g., "pricing", "customer reviews", "technology stack").
    * `metrics`: (List of strings) Specific KPIs or metrics mentioned.
    * `original_query`: (String) The original user query text.
3.  `required_searches`: (List of strings) Generate 10-15 specific, effective search engine queries (as strings) that would yield *current* information needed to thoroughly answer the user's query, considering the business context. Focus on information likely available publicly online (news, company websites, review sites, market reports summaries). Examples: "latest market share report [industry] [year]", "[Competitor Name] pricing model", "customer reviews [Competitor Name] [product]", "recent technology trends impacting [industry]". Avoid overly broad queries.

**Example Output Format (Do NOT include this example in your actual response):**
```json
{{
  "query_type": "competitive_analysis",
  "entities": {{
    "competitors": ["Acme Corp", "Beta Solutions"],
    "industry": "Mid-Market SaaS Solutions",
    "products_services": [],
    "geography": null,
    "time_horizon": null,
    "focus_areas": ["pricing", "customer support quality"],
    "metrics": [],
    "original_query": "How do we compare against Acme Corp and Beta Solutions on pricing and customer support?"
  }},
  "required_searches": [
    "Acme Corp SaaS pricing model {year}",
    "Beta Solutions SaaS pricing model {year}",
    "Acme Corp customer support reviews G2 Crowd",
    "Beta Solutions customer support reviews Capterra",
    "Mid-Market SaaS customer support benchmarks {year}"
  ]
}}
```
Important: Generate ONLY the JSON object as your response. Do not include explanations or introductions. Ensure the JSON is valid."#,
        today = today.format("%Y-%m-%d"),
    )
}
