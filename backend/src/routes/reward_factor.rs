use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::{ContractId, MeasureCode};

// =========================================================
// Reward Factor types + route
// =========================================================

/// Weighted performance of one contract over its measure ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortStats {
    pub weighted_mean: Option<f64>,
    pub weighted_variance: Option<f64>,
    pub measure_count: usize,
}

impl CohortStats {
    pub const EMPTY: CohortStats = CohortStats {
        weighted_mean: None,
        weighted_variance: None,
        measure_count: 0,
    };

    pub fn is_scored(&self) -> bool {
        self.weighted_mean.is_some() && self.weighted_variance.is_some()
    }
}

/// Percent of scored contracts at or below a contract's weighted mean and variance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileRanks {
    pub mean: Option<f64>,
    pub variance: Option<f64>,
}

/// Population cut lines for the Reward Factor lookup.
///
/// Field names follow the program's default lines; the actual percentiles
/// come from the engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileThresholds {
    pub mean_65th: f64,
    pub mean_85th: f64,
    pub variance_30th: f64,
    pub variance_70th: f64,
}

/// Where a contract's weighted mean falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanCategory {
    High,
    RelativelyHigh,
    Below,
}

/// Where a contract's weighted variance falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceCategory {
    Low,
    Medium,
    High,
}

/// Current vs. projected Reward Factor for one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRewardFactor {
    pub contract_id: ContractId,
    pub contract_name: Option<String>,
    pub current: CohortStats,
    pub projected: CohortStats,
    pub current_percentiles: PercentileRanks,
    pub projected_percentiles: PercentileRanks,
    pub current_mean_category: Option<MeanCategory>,
    pub current_variance_category: Option<VarianceCategory>,
    pub projected_mean_category: Option<MeanCategory>,
    pub projected_variance_category: Option<VarianceCategory>,
    pub current_r_factor: f64,
    pub projected_r_factor: f64,
    pub r_factor_change: f64,
    /// Weighted mean plus current Reward Factor.
    pub current_rating: Option<f64>,
    pub current_rating_rounded: Option<f64>,
    /// Projected weighted mean before the Reward Factor is added.
    pub projected_rating_without_measures: Option<f64>,
    pub final_projected: Option<f64>,
    pub final_projected_rounded: Option<f64>,
    /// Signed half-star steps between the rounded current and final ratings.
    pub star_bracket_change: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_rating: Option<f64>,
}

/// Calculated vs. official value of one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdDifference {
    pub calculated: f64,
    pub official: f64,
    pub difference: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_difference: Option<f64>,
}

/// Calibration report against published thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdComparison {
    pub mean_65th: ThresholdDifference,
    pub mean_85th: ThresholdDifference,
    pub variance_30th: ThresholdDifference,
    pub variance_70th: ThresholdDifference,
}

/// Short record used by the top gainers / losers lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardFactorMover {
    pub contract_id: ContractId,
    pub contract_name: Option<String>,
    pub current_r_factor: f64,
    pub projected_r_factor: f64,
    pub r_factor_change: f64,
}

/// Population-level summary of Reward Factor movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardFactorSummary {
    pub total_contracts: usize,
    pub contracts_gaining_r_factor: usize,
    pub contracts_losing_r_factor: usize,
    pub contracts_unchanged: usize,
    pub avg_r_factor_change: f64,
    /// Counts keyed by labels such as `"gained +0.2"` or `"lost -0.1"`.
    pub change_distribution: BTreeMap<String, usize>,
    pub top_gainers: Vec<RewardFactorMover>,
    pub top_losers: Vec<RewardFactorMover>,
}

/// Complete Reward Factor projection for a year and exclusion set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardFactorData {
    pub year: i32,
    pub excluded_measures: Vec<MeasureCode>,
    pub current_thresholds: Option<PercentileThresholds>,
    pub projected_thresholds: Option<PercentileThresholds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_thresholds: Option<PercentileThresholds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_comparison: Option<ThresholdComparison>,
    pub contracts: Vec<ContractRewardFactor>,
    /// Rated contracts with no weighted measures to rank.
    pub unscored_contracts: Vec<ContractId>,
    pub summary: RewardFactorSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_field_names() {
        let thresholds = PercentileThresholds {
            mean_65th: 3.5,
            mean_85th: 4.0,
            variance_30th: 0.6,
            variance_70th: 1.1,
        };
        let json = serde_json::to_value(thresholds).unwrap();
        assert_eq!(json["mean65th"], 3.5);
        assert_eq!(json["mean85th"], 4.0);
        assert_eq!(json["variance30th"], 0.6);
        assert_eq!(json["variance70th"], 1.1);
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&MeanCategory::RelativelyHigh).unwrap(),
            "\"relatively_high\""
        );
        assert_eq!(
            serde_json::to_string(&VarianceCategory::Low).unwrap(),
            "\"low\""
        );
    }

    #[test]
    fn test_empty_stats_not_scored() {
        assert!(!CohortStats::EMPTY.is_scored());
    }
}
