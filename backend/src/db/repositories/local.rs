//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing, local development and serving a dataset file.
//! All data is stored in memory, giving fast, deterministic and isolated
//! execution.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use crate::api::{DatasetInfo, PercentileThresholds};
use crate::db::dataset::{Dataset, OfficialThresholdsEntry};
use crate::db::repository::*;
use crate::models::{Contract, MeasureMeta, MetricObservation, OverallRating, PlanEnrollment};

/// In-memory local repository.
///
/// # Example
/// ```
/// use ma_stars::db::repositories::LocalRepository;
/// use ma_stars::models::MetricObservation;
///
/// let repo = LocalRepository::new();
/// repo.add_metrics(vec![MetricObservation::new("H1", "C01", Some(4.0.into()), Some(71.0), 2025)]);
/// assert_eq!(repo.metric_count(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    dataset: Dataset,
    checksum: Option<String>,
    loaded_at: Option<DateTime<Utc>>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            dataset: Dataset::default(),
            checksum: None,
            loaded_at: None,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create a repository holding an already-parsed dataset.
    pub fn from_dataset(dataset: Dataset) -> Self {
        let repo = Self::new();
        {
            let mut data = repo.data.write();
            data.dataset = dataset;
            data.loaded_at = Some(Utc::now());
        }
        repo
    }

    /// Load a dataset file into a new repository.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let loaded = Dataset::load_file(path)?;
        let repo = Self::from_dataset(loaded.dataset);
        repo.data.write().checksum = Some(loaded.checksum);
        Ok(repo)
    }

    pub fn add_contracts(&self, contracts: Vec<Contract>) {
        self.data.write().dataset.contracts.extend(contracts);
    }

    pub fn add_plans(&self, plans: Vec<PlanEnrollment>) {
        self.data.write().dataset.plans.extend(plans);
    }

    pub fn add_measures(&self, measures: Vec<MeasureMeta>) {
        self.data.write().dataset.measures.extend(measures);
    }

    pub fn add_metrics(&self, metrics: Vec<MetricObservation>) {
        self.data.write().dataset.metrics.extend(metrics);
    }

    pub fn add_overall_ratings(&self, ratings: Vec<OverallRating>) {
        self.data.write().dataset.overall_ratings.extend(ratings);
    }

    /// Set (or replace) the published thresholds for a year.
    pub fn set_official_thresholds(&self, year: i32, thresholds: PercentileThresholds) {
        let mut data = self.data.write();
        let entries = &mut data.dataset.official_thresholds;
        entries.retain(|e| e.year != year);
        entries.push(OfficialThresholdsEntry { year, thresholds });
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of metric rows stored.
    pub fn metric_count(&self) -> usize {
        self.data.read().dataset.metrics.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Data source is not healthy"));
        }
        Ok(())
    }

    /// Helper for the common "rows of one year" query.
    fn rows_for_year<T: Clone>(
        &self,
        select: impl FnOnce(&Dataset) -> &Vec<T>,
        year_of: impl Fn(&T) -> i32,
        year: i32,
    ) -> RepositoryResult<Vec<T>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(select(&data.dataset)
            .iter()
            .filter(|row| year_of(row) == year)
            .cloned()
            .collect())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Ratings Repository ====================

#[async_trait]
impl RatingsRepository for LocalRepository {
    async fn fetch_metric_observations(
        &self,
        year: i32,
    ) -> RepositoryResult<Vec<MetricObservation>> {
        self.rows_for_year(|d| &d.metrics, |m| m.year, year)
    }

    async fn fetch_measure_meta(&self) -> RepositoryResult<Vec<MeasureMeta>> {
        self.check_health()?;
        Ok(self.data.read().dataset.measures.clone())
    }

    async fn fetch_overall_ratings(&self, year: i32) -> RepositoryResult<Vec<OverallRating>> {
        self.rows_for_year(|d| &d.overall_ratings, |r| r.year, year)
    }

    async fn fetch_official_thresholds(
        &self,
        year: i32,
    ) -> RepositoryResult<Option<PercentileThresholds>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .dataset
            .official_thresholds
            .iter()
            .find(|e| e.year == year)
            .map(|e| e.thresholds))
    }
}

// ==================== Contract Repository ====================

#[async_trait]
impl ContractRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn list_years(&self) -> RepositoryResult<Vec<i32>> {
        self.check_health()?;
        let data = self.data.read();
        let years: BTreeSet<i32> = data.dataset.metrics.iter().map(|m| m.year).collect();
        Ok(years.into_iter().collect())
    }

    async fn fetch_contracts(&self, year: i32) -> RepositoryResult<Vec<Contract>> {
        self.rows_for_year(|d| &d.contracts, |c| c.year, year)
    }

    async fn fetch_plan_enrollment(&self, year: i32) -> RepositoryResult<Vec<PlanEnrollment>> {
        self.rows_for_year(|d| &d.plans, |p| p.year, year)
    }

    async fn dataset_info(&self) -> RepositoryResult<DatasetInfo> {
        self.check_health()?;
        let data = self.data.read();
        let dataset = &data.dataset;

        let years: BTreeSet<i32> = dataset.metrics.iter().map(|m| m.year).collect();
        let contracts: HashSet<_> = dataset.contracts.iter().map(|c| &c.contract_id).collect();
        let measures: HashSet<_> = dataset.measures.iter().map(|m| &m.code).collect();

        Ok(DatasetInfo {
            years: years.into_iter().collect(),
            contract_count: contracts.len(),
            measure_count: measures.len(),
            observation_count: dataset.metrics.len(),
            checksum: data.checksum.clone(),
            loaded_at: data.loaded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ContractId;

    fn contract(id: &str, year: i32) -> Contract {
        Contract {
            contract_id: ContractId::from(id),
            contract_name: None,
            parent_organization: None,
            year,
        }
    }

    #[tokio::test]
    async fn test_rows_filtered_by_year() {
        let repo = LocalRepository::new();
        repo.add_contracts(vec![contract("H1", 2024), contract("H1", 2025), contract("H2", 2025)]);
        repo.add_metrics(vec![
            MetricObservation::new("H1", "C01", Some(3.0.into()), Some(60.0), 2024),
            MetricObservation::new("H1", "C01", Some(4.0.into()), Some(70.0), 2025),
        ]);

        assert_eq!(repo.fetch_contracts(2025).await.unwrap().len(), 2);
        assert_eq!(repo.fetch_metric_observations(2024).await.unwrap().len(), 1);
        assert_eq!(repo.list_years().await.unwrap(), vec![2024, 2025]);
    }

    #[tokio::test]
    async fn test_unhealthy_repository_errors() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.fetch_metric_observations(2025).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_official_thresholds_replace() {
        let repo = LocalRepository::new();
        let t = PercentileThresholds {
            mean_65th: 3.5,
            mean_85th: 4.0,
            variance_30th: 0.5,
            variance_70th: 1.0,
        };
        repo.set_official_thresholds(2025, t);
        repo.set_official_thresholds(
            2025,
            PercentileThresholds {
                mean_65th: 3.6,
                ..t
            },
        );
        let fetched = repo.fetch_official_thresholds(2025).await.unwrap().unwrap();
        assert_eq!(fetched.mean_65th, 3.6);
        assert!(repo.fetch_official_thresholds(2024).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_keeps_health() {
        let repo = LocalRepository::new();
        repo.add_metrics(vec![MetricObservation::new("H1", "C01", None, Some(1.0), 2025)]);
        repo.clear();
        assert_eq!(repo.metric_count(), 0);
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_dataset_info_counts() {
        let repo = LocalRepository::new();
        repo.add_contracts(vec![contract("H1", 2024), contract("h1", 2025)]);
        repo.add_metrics(vec![MetricObservation::new("H1", "C01", None, Some(1.0), 2025)]);
        let info = repo.dataset_info().await.unwrap();
        assert_eq!(info.contract_count, 1);
        assert_eq!(info.observation_count, 1);
        assert_eq!(info.years, vec![2025]);
        assert!(info.checksum.is_none());
    }
}
