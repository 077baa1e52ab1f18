use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// The company every report is written for. Loaded once at startup and
/// shared read-only by all queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub company_name: String,
    pub industry: String,
    pub size: String,
    pub primary_products: Vec<String>,
    pub target_customer: String,
    pub goals: Vec<String>,
}

impl BusinessProfile {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading business profile {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing business profile {}", path.display()))
    }

    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn core_products(&self) -> String {
        self.primary_products.join(", ")
    }
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            company_name: "Setu".to_string(),
            industry: "Financial Services".to_string(),
            size: "201-500 employees (growth from 51-200 in 2020)".to_string(),
            primary_products: vec![
                "API solutions for financial onboarding (KYC, Aadhaar/PAN verification)"
                    .to_string(),
                "Payment infrastructure (BBPS, UPI payment links)".to_string(),
                "Account Aggregator services".to_string(),
            ],
            target_customer:
                "Fintech companies, banks, and businesses requiring financial infrastructure"
                    .to_string(),
            goals: vec![
                "Simplify financial integration through APIs".to_string(),
                "Enable seamless bill payments and loan repayments at scale".to_string(),
                "Promote financial inclusion through open-source initiatives (D91 Labs)"
                    .to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_round_trips_through_json() {
        let profile = BusinessProfile::default();
        let json = serde_json::to_string(&profile).unwrap();
        let parsed: BusinessProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, profile);
    }

    #[test]
    fn test_load_without_path_uses_default() {
        let profile = BusinessProfile::load(None).unwrap();
        assert_eq!(profile.company_name, "Setu");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = BusinessProfile::load(Some("/nonexistent/profile.json")).unwrap_err();
        assert!(err.to_string().contains("reading business profile"));
    }

    #[test]
    fn test_core_products_joined() {
        let profile = BusinessProfile {
            primary_products: vec!["A".into(), "B".into()],
            ..BusinessProfile::default()
        };
        assert_eq!(profile.core_products(), "A, B");
    }
}
