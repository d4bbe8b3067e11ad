//! Engine constants.
//!
//! Program-rule constants (proximity tolerance, percentile cut lines and the
//! Reward Factor lookup table) live in one immutable object that every
//! analytics operation receives. Values come from the `[engine]` section of
//! `repository.toml`; every key is optional.

use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;

/// Reward Factor values allowed by the program rules.
pub const ALLOWED_REWARD_FACTORS: [f64; 5] = [0.0, 0.1, 0.2, 0.3, 0.4];

/// Fixed 3x3 Reward Factor lookup.
///
/// Each row is indexed by variance category: `[low, medium, high]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardFactorTable {
    #[serde(default = "default_high_row")]
    pub high: [f64; 3],
    #[serde(default = "default_relatively_high_row")]
    pub relatively_high: [f64; 3],
    #[serde(default = "default_below_row")]
    pub below: [f64; 3],
}

fn default_high_row() -> [f64; 3] {
    [0.4, 0.3, 0.0]
}

fn default_relatively_high_row() -> [f64; 3] {
    [0.2, 0.1, 0.0]
}

fn default_below_row() -> [f64; 3] {
    [0.0, 0.0, 0.0]
}

impl Default for RewardFactorTable {
    fn default() -> Self {
        Self {
            high: default_high_row(),
            relatively_high: default_relatively_high_row(),
            below: default_below_row(),
        }
    }
}

impl RewardFactorTable {
    fn rows(&self) -> [(&'static str, &[f64; 3]); 3] {
        [
            ("high", &self.high),
            ("relatively_high", &self.relatively_high),
            ("below", &self.below),
        ]
    }
}

/// Analytics engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Distance (in score points) from a cut point that counts as "near".
    #[serde(default = "default_proximity_threshold")]
    pub proximity_threshold: f64,
    /// Percentile lines for the weighted mean: `[relatively_high, high]`.
    #[serde(default = "default_mean_percentiles")]
    pub mean_percentiles: [f64; 2],
    /// Percentile lines for the weighted variance: `[low, high]`.
    #[serde(default = "default_variance_percentiles")]
    pub variance_percentiles: [f64; 2],
    #[serde(default)]
    pub reward_table: RewardFactorTable,
    /// Length of the top gainers / top losers lists.
    #[serde(default = "default_top_movers")]
    pub top_movers: usize,
    /// Measure codes flagged as HEDIS besides those whose domain says so.
    #[serde(default)]
    pub hedis_measures: Vec<String>,
}

fn default_proximity_threshold() -> f64 {
    2.0
}

fn default_mean_percentiles() -> [f64; 2] {
    [65.0, 85.0]
}

fn default_variance_percentiles() -> [f64; 2] {
    [30.0, 70.0]
}

fn default_top_movers() -> usize {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: default_proximity_threshold(),
            mean_percentiles: default_mean_percentiles(),
            variance_percentiles: default_variance_percentiles(),
            reward_table: RewardFactorTable::default(),
            top_movers: default_top_movers(),
            hedis_measures: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Check the constants are internally consistent.
    pub fn validate(&self) -> Result<(), RepositoryError> {
        if !self.proximity_threshold.is_finite() || self.proximity_threshold < 0.0 {
            return Err(RepositoryError::configuration(format!(
                "proximity_threshold must be a non-negative number, got {}",
                self.proximity_threshold
            )));
        }

        for (name, [low, high]) in [
            ("mean_percentiles", self.mean_percentiles),
            ("variance_percentiles", self.variance_percentiles),
        ] {
            let in_range = |p: f64| p.is_finite() && (0.0..=100.0).contains(&p);
            if !in_range(low) || !in_range(high) {
                return Err(RepositoryError::configuration(format!(
                    "{} must lie within [0, 100], got [{}, {}]",
                    name, low, high
                )));
            }
            if low > high {
                return Err(RepositoryError::configuration(format!(
                    "{} must be ascending, got [{}, {}]",
                    name, low, high
                )));
            }
        }

        for (row_name, row) in self.reward_table.rows() {
            for value in row.iter() {
                let allowed = ALLOWED_REWARD_FACTORS
                    .iter()
                    .any(|a| (a - value).abs() < 1e-9);
                if !allowed {
                    return Err(RepositoryError::configuration(format!(
                        "reward_table.{} contains {} which is not a valid Reward Factor",
                        row_name, value
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn is_hedis_code(&self, code: &str) -> bool {
        self.hedis_measures
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(code.trim()))
    }
}
