//! Public API surface for the ratings analytics backend.
//!
//! This file consolidates the DTO types for the HTTP API.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::routes::compare::CohortDistribution;
pub use crate::routes::compare::CohortSummary;
pub use crate::routes::compare::DistributionData;
pub use crate::routes::compare::MeasureDistribution;
pub use crate::routes::compare::StarDistribution;
pub use crate::routes::compare::StarPercentages;
pub use crate::routes::compare::StarScoreStats;
pub use crate::routes::cut_points::CutPointData;
pub use crate::routes::cut_points::CutPointSet;
pub use crate::routes::landing::DatasetInfo;
pub use crate::routes::landing::OrganizationInfo;
pub use crate::routes::reward_factor::CohortStats;
pub use crate::routes::reward_factor::ContractRewardFactor;
pub use crate::routes::reward_factor::MeanCategory;
pub use crate::routes::reward_factor::PercentileRanks;
pub use crate::routes::reward_factor::PercentileThresholds;
pub use crate::routes::reward_factor::RewardFactorData;
pub use crate::routes::reward_factor::RewardFactorMover;
pub use crate::routes::reward_factor::RewardFactorSummary;
pub use crate::routes::reward_factor::ThresholdComparison;
pub use crate::routes::reward_factor::ThresholdDifference;
pub use crate::routes::reward_factor::VarianceCategory;
pub use crate::routes::risk::ContractClassification;
pub use crate::routes::risk::ContractRiskSummary;
pub use crate::routes::risk::RiskOpportunityData;
pub use crate::routes::trends::HighStarTrendData;
pub use crate::routes::trends::ImprovementLeader;
pub use crate::routes::trends::MeasureHighStarChange;

pub use crate::models::{
    Contract, MeasureCatalog, MeasureMeta, MetricObservation, OverallRating, PlanEnrollment,
    StarBucket, StarValue,
};

use serde::{Deserialize, Serialize};

/// Contract identifier (e.g. `H1234`), always trimmed and upper-cased.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub struct ContractId(String);

/// Measure code (e.g. `C01`, `D08`), always trimmed and upper-cased.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub struct MeasureCode(String);

impl ContractId {
    /// Build a contract id, normalizing whitespace and case.
    pub fn normalized(raw: &str) -> Self {
        ContractId(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl MeasureCode {
    pub fn new(raw: &str) -> Self {
        MeasureCode(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part D (pharmacy) measures are coded with a leading `D`.
    pub fn is_part_d(&self) -> bool {
        self.0.starts_with('D')
    }
}

impl From<String> for ContractId {
    fn from(raw: String) -> Self {
        ContractId::normalized(&raw)
    }
}

impl From<&str> for ContractId {
    fn from(raw: &str) -> Self {
        ContractId::normalized(raw)
    }
}

impl From<ContractId> for String {
    fn from(id: ContractId) -> Self {
        id.0
    }
}

impl From<String> for MeasureCode {
    fn from(raw: String) -> Self {
        MeasureCode::new(&raw)
    }
}

impl From<&str> for MeasureCode {
    fn from(raw: &str) -> Self {
        MeasureCode::new(raw)
    }
}

impl From<MeasureCode> for String {
    fn from(code: MeasureCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for MeasureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
