//! JSON dataset file loading.
//!
//! A dataset file bundles every entity the engine consumes:
//!
//! ```json
//! {
//!   "contracts": [{ "contract_id": "H1234", "parent_organization": "Acme", "year": 2025 }],
//!   "plans": [{ "contract_id": "H1234", "plan_id": "001", "year": 2025, "enrollment": 1200 }],
//!   "measures": [{ "code": "C01", "name": "Breast Cancer Screening", "weight": 1.0, "year": 2025 }],
//!   "metrics": [{ "contract_id": "H1234", "measure_code": "C01", "star_rating": "4", "rate_percent": 74.0, "year": 2025 }],
//!   "overall_ratings": [{ "contract_id": "H1234", "year": 2025, "overall_rating": 4.5 }],
//!   "official_thresholds": [{ "year": 2025, "mean65th": 3.8, "mean85th": 4.1, "variance30th": 0.7, "variance70th": 1.1 }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::checksum::calculate_checksum;
use super::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::api::PercentileThresholds;
use crate::models::{Contract, MeasureMeta, MetricObservation, OverallRating, PlanEnrollment};

/// Published Reward Factor thresholds for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfficialThresholdsEntry {
    pub year: i32,
    #[serde(flatten)]
    pub thresholds: PercentileThresholds,
}

/// In-memory image of a dataset file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub contracts: Vec<Contract>,
    #[serde(default)]
    pub plans: Vec<PlanEnrollment>,
    #[serde(default)]
    pub measures: Vec<MeasureMeta>,
    #[serde(default)]
    pub metrics: Vec<MetricObservation>,
    #[serde(default)]
    pub overall_ratings: Vec<OverallRating>,
    #[serde(default)]
    pub official_thresholds: Vec<OfficialThresholdsEntry>,
}

/// A parsed dataset with the checksum of its source text.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub checksum: String,
}

impl Dataset {
    /// Parse a dataset from JSON text.
    ///
    /// Errors name the JSON path that failed to decode, e.g.
    /// `metrics[12].year: invalid type`.
    pub fn from_json_str(content: &str) -> RepositoryResult<Self> {
        Self::decode(content, ErrorContext::new("parse_dataset").with_entity("dataset"))
    }

    fn decode(content: &str, context: ErrorContext) -> RepositoryResult<Self> {
        let deserializer = &mut serde_json::Deserializer::from_str(content);
        serde_path_to_error::deserialize(deserializer).map_err(|e| {
            RepositoryError::validation_with_context(
                format!("Invalid dataset JSON at {}: {}", e.path(), e.inner()),
                context,
            )
        })
    }

    /// Read and parse a dataset file, keeping the checksum of its content.
    pub fn load_file<P: AsRef<Path>>(path: P) -> RepositoryResult<LoadedDataset> {
        let path = path.as_ref();
        let context = ErrorContext::new("load_dataset")
            .with_entity("dataset")
            .with_entity_id(path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read dataset file: {}", e),
                context.clone(),
            )
        })?;

        let dataset = Self::decode(&content, context)?;
        log::info!(
            "Loaded dataset {}: {} contracts, {} measures, {} metric rows",
            path.display(),
            dataset.contracts.len(),
            dataset.measures.len(),
            dataset.metrics.len()
        );

        Ok(LoadedDataset {
            dataset,
            checksum: calculate_checksum(&content),
        })
    }
}
