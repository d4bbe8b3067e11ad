//! Contract repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::DatasetInfo;
use crate::models::{Contract, PlanEnrollment};

/// Repository trait for contracts, plans and dataset-level queries.
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Check if the data source is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Rating years with at least one metric observation, ascending.
    async fn list_years(&self) -> RepositoryResult<Vec<i32>>;

    /// Fetch contracts for a year.
    async fn fetch_contracts(&self, year: i32) -> RepositoryResult<Vec<Contract>>;

    /// Fetch plan enrollment rows for a year.
    async fn fetch_plan_enrollment(&self, year: i32) -> RepositoryResult<Vec<PlanEnrollment>>;

    /// Summary counts and provenance for the whole dataset.
    async fn dataset_info(&self) -> RepositoryResult<DatasetInfo>;
}
