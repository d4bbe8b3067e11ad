use serde::{Deserialize, Serialize};

use crate::api::{ContractId, MeasureCode};
use crate::models::StarBucket;

// =========================================================
// Risk / opportunity types + route
// =========================================================

/// One contract-measure observation measured against its cut points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractClassification {
    pub measure_code: MeasureCode,
    pub measure_name: Option<String>,
    pub domain: Option<String>,
    pub score: f64,
    pub star_rating: StarBucket,
    pub lower_cut_point: Option<f64>,
    pub upper_cut_point: Option<f64>,
    pub is_risk: bool,
    pub risk_points: Option<f64>,
    pub is_opportunity: bool,
    pub opportunity_points: Option<f64>,
    #[serde(rename = "isHEDIS")]
    pub is_hedis: bool,
    pub is_pharmacy: bool,
}

/// Flags for one contract, closest to the line first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRiskSummary {
    pub contract_id: ContractId,
    pub contract_name: Option<String>,
    pub risk_measures: Vec<ContractClassification>,
    pub opportunity_measures: Vec<ContractClassification>,
    pub risk_count: usize,
    pub opportunity_count: usize,
}

/// Risk and opportunity flags for a cohort of contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskOpportunityData {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub proximity_threshold: f64,
    pub analyzed_measures: usize,
    pub contracts: Vec<ContractRiskSummary>,
    pub total_risk: usize,
    pub total_opportunity: usize,
    pub contracts_with_risk: usize,
    pub contracts_with_opportunity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_field_names() {
        let classification = ContractClassification {
            measure_code: MeasureCode::new("C01"),
            measure_name: None,
            domain: Some("Staying Healthy: Screenings, Tests and Vaccines".to_string()),
            score: 72.0,
            star_rating: StarBucket::new(3).unwrap(),
            lower_cut_point: Some(71.0),
            upper_cut_point: None,
            is_risk: true,
            risk_points: Some(1.0),
            is_opportunity: false,
            opportunity_points: None,
            is_hedis: true,
            is_pharmacy: false,
        };
        let json = serde_json::to_value(&classification).unwrap();
        assert_eq!(json["isHEDIS"], true);
        assert_eq!(json["isPharmacy"], false);
        assert_eq!(json["riskPoints"], 1.0);
        assert_eq!(json["starRating"], 3);
        assert!(json["upperCutPoint"].is_null());
    }
}
