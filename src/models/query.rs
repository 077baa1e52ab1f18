use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Report category chosen by classification. Every tag resolves to a
/// variant; anything unrecognised becomes `Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum QueryType {
    CompetitiveAnalysis,
    TrendForecasting,
    SwotAnalysis,
    MarketingStrategy,
    FinancialAnalysis,
    Generic,
}

impl QueryType {
    pub const ALL: [QueryType; 6] = [
        QueryType::CompetitiveAnalysis,
        QueryType::TrendForecasting,
        QueryType::SwotAnalysis,
        QueryType::MarketingStrategy,
        QueryType::FinancialAnalysis,
        QueryType::Generic,
    ];

    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "competitive_analysis" => QueryType::CompetitiveAnalysis,
            "trend_forecasting" => QueryType::TrendForecasting,
            "swot_analysis" => QueryType::SwotAnalysis,
            "marketing_strategy" => QueryType::MarketingStrategy,
            "financial_analysis" => QueryType::FinancialAnalysis,
            // "generic", "generic_business_question", "market_research", "other", ...
            _ => QueryType::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::CompetitiveAnalysis => "competitive_analysis",
            QueryType::TrendForecasting => "trend_forecasting",
            QueryType::SwotAnalysis => "swot_analysis",
            QueryType::MarketingStrategy => "marketing_strategy",
            QueryType::FinancialAnalysis => "financial_analysis",
            QueryType::Generic => "generic",
        }
    }

    /// `swot_analysis` -> `Swot Analysis`
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<String> for QueryType {
    fn from(tag: String) -> Self {
        QueryType::from_tag(&tag)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities pulled out of the query. Empty lists and `None` both mean
/// "not mentioned"; templates fill in their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entities {
    pub competitors: Vec<String>,
    pub industry: Option<String>,
    pub products_services: Vec<String>,
    pub geography: Option<String>,
    pub time_horizon: Option<String>,
    pub focus_areas: Vec<String>,
    pub metrics: Vec<String>,
    pub original_query: Option<String>,
}

impl Entities {
    pub fn for_query(query: &str) -> Self {
        Self {
            original_query: Some(query.to_string()),
            ..Self::default()
        }
    }

    /// Reads the recognised keys from a model-produced JSON object. Models
    /// are loose with types, so lists accept a bare string and strings
    /// accept a list.
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key);
        Self {
            competitors: string_list(field("competitors")),
            industry: text(field("industry")),
            products_services: string_list(field("products_services")),
            geography: text(field("geography")),
            time_horizon: text(field("time_horizon")),
            focus_areas: string_list(field("focus_areas")),
            metrics: string_list(field("metrics")),
            original_query: text(field("original_query")),
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(other) => scalar_text(other)
            .filter(|s| !s.is_empty())
            .into_iter()
            .collect(),
        None => Vec::new(),
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::Array(_)) => {
            let joined = string_list(value).join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        Some(other) => scalar_text(other).filter(|s| !s.is_empty()),
        None => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Outcome of classifying one query. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnalysis {
    pub query_type: QueryType,
    pub entities: Entities,
    pub required_searches: Vec<String>,
    pub error: Option<String>,
}

impl QueryAnalysis {
    /// Degraded analysis used when classification cannot be trusted.
    pub fn fallback(query: &str, error: impl Into<String>) -> Self {
        Self {
            query_type: QueryType::Generic,
            entities: Entities::for_query(query),
            required_searches: Vec::new(),
            error: Some(error.into()),
        }
    }
}
