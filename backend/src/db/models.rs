//! Shared data models for database layer consumers.

use std::collections::{HashMap, HashSet};

pub use crate::api::{ContractId, MeasureCode, PercentileThresholds};
pub use crate::models::{
    Contract, MeasureCatalog, MeasureMeta, MetricObservation, OverallRating, PlanEnrollment,
};

/// Everything the analytics engine needs for one rating year, fetched in full
/// before analysis starts.
#[derive(Debug, Clone)]
pub struct YearSnapshot {
    pub year: i32,
    pub observations: Vec<MetricObservation>,
    pub catalog: MeasureCatalog,
    pub contracts: Vec<Contract>,
    pub enrollment: Vec<PlanEnrollment>,
    pub overall_ratings: Vec<OverallRating>,
    pub official_thresholds: Option<PercentileThresholds>,
}

impl YearSnapshot {
    /// Contracts holding a valid official overall rating this year.
    pub fn rated_contract_ids(&self) -> HashSet<ContractId> {
        self.overall_ratings
            .iter()
            .filter(|r| r.year == self.year && r.is_rated())
            .map(|r| r.contract_id.clone())
            .collect()
    }

    /// Official overall rating per rated contract.
    pub fn official_ratings(&self) -> HashMap<ContractId, f64> {
        self.overall_ratings
            .iter()
            .filter(|r| r.year == self.year)
            .filter_map(|r| r.rating().map(|rating| (r.contract_id.clone(), rating)))
            .collect()
    }

    pub fn contract_names(&self) -> HashMap<ContractId, String> {
        self.contracts
            .iter()
            .filter_map(|c| {
                c.contract_name
                    .as_ref()
                    .map(|name| (c.contract_id.clone(), name.clone()))
            })
            .collect()
    }

    /// Contracts whose parent organization matches `organization`.
    pub fn organization_contract_ids(&self, organization: &str) -> HashSet<ContractId> {
        self.contracts
            .iter()
            .filter(|c| c.belongs_to(organization))
            .map(|c| c.contract_id.clone())
            .collect()
    }

    /// Total enrollment across plans of the given contracts.
    pub fn total_enrollment(&self, contracts: &HashSet<ContractId>) -> u64 {
        self.enrollment
            .iter()
            .filter(|p| p.year == self.year && contracts.contains(&p.contract_id))
            .filter_map(|p| p.enrollment)
            .sum()
    }
}
