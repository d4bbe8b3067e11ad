//! Ratings repository trait.
//!
//! Measure-level metrics, measure metadata, official overall ratings and
//! published Reward Factor thresholds.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::PercentileThresholds;
use crate::models::{MeasureMeta, MetricObservation, OverallRating};

/// Repository trait for ratings data.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait RatingsRepository: Send + Sync {
    /// Fetch every metric observation recorded for a rating year.
    ///
    /// # Arguments
    /// * `year` - Rating year
    ///
    /// # Returns
    /// * `Ok(Vec<MetricObservation>)` - Observations, possibly empty
    /// * `Err(RepositoryError)` - If the operation fails
    async fn fetch_metric_observations(&self, year: i32)
        -> RepositoryResult<Vec<MetricObservation>>;

    /// Fetch measure metadata for all years.
    ///
    /// Callers resolve one entry per code with [`crate::models::MeasureCatalog`].
    async fn fetch_measure_meta(&self) -> RepositoryResult<Vec<MeasureMeta>>;

    /// Fetch official overall ratings for a year.
    async fn fetch_overall_ratings(&self, year: i32) -> RepositoryResult<Vec<OverallRating>>;

    /// Fetch the published Reward Factor thresholds for a year, when known.
    ///
    /// # Returns
    /// * `Ok(None)` - No official reference has been supplied for the year
    async fn fetch_official_thresholds(
        &self,
        year: i32,
    ) -> RepositoryResult<Option<PercentileThresholds>>;
}
