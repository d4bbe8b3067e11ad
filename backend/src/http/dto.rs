//! Data Transfer Objects for the HTTP API.
//!
//! Response bodies are re-exported from the routes module since they already
//! derive Serialize/Deserialize; this module adds the query strings and the
//! small envelopes specific to HTTP.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    // Cut points
    CutPointData,
    // Distributions
    DistributionData,
    // Landing
    DatasetInfo, OrganizationInfo,
    // Reward Factor
    RewardFactorData,
    // Risk
    RiskOpportunityData,
    // Trends
    HighStarTrendData,
};
use crate::api::MeasureCode;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Organizations of one rating year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationListResponse {
    pub year: i32,
    pub organizations: Vec<OrganizationInfo>,
    pub total: usize,
}

/// Query parameters for the risk / opportunity endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RiskQuery {
    /// Parent organization to analyze; every rated contract when absent
    #[serde(default)]
    pub organization: Option<String>,
}

/// Query parameters for the Reward Factor endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RewardFactorQuery {
    /// Comma-separated measure codes removed in the projected pass
    #[serde(default)]
    pub exclude: Option<String>,
    /// Override for the length of the top gainers / losers lists
    #[serde(default)]
    pub top: Option<usize>,
}

impl RewardFactorQuery {
    /// Measure codes listed in `exclude`, blanks dropped.
    pub fn excluded_measures(&self) -> Vec<MeasureCode> {
        self.exclude
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(MeasureCode::new)
            .filter(|c| !c.as_str().is_empty())
            .collect()
    }
}

/// Query parameters for the distributions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DistributionQuery {
    /// Focus organization compared against the rest of the market
    #[serde(default)]
    pub organization: Option<String>,
}

/// Query parameters for the year-over-year trends endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrendsQuery {
    #[serde(default)]
    pub organization: Option<String>,
    /// Earlier year; defaults to the year before `to`
    #[serde(default)]
    pub from: Option<i32>,
    /// Later year; defaults to the most recent year
    #[serde(default)]
    pub to: Option<i32>,
}

/// Non-blank organization parameter, trimmed.
pub fn required_organization(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_measures_parsing() {
        let query = RewardFactorQuery {
            exclude: Some("C01, D02,,".to_string()),
            top: None,
        };
        let codes = query.excluded_measures();
        assert_eq!(codes, vec![MeasureCode::from("C01"), MeasureCode::from("D02")]);
        assert!(RewardFactorQuery::default().excluded_measures().is_empty());
    }

    #[test]
    fn test_required_organization() {
        assert_eq!(required_organization(Some(" Acme ")), Some("Acme".to_string()));
        assert_eq!(required_organization(Some("  ")), None);
        assert_eq!(required_organization(None), None);
    }
}
