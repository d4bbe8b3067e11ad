use serde::{Deserialize, Serialize};

use crate::api::MeasureCode;
use crate::models::StarBucket;
use crate::services::stats::Quartiles;

// =========================================================
// Cohort distribution types + route
// =========================================================

/// Five-bucket star histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarDistribution {
    /// Index 0 holds 1-star counts, index 4 holds 5-star counts.
    pub counts: [usize; 5],
    pub total: usize,
}

impl StarDistribution {
    pub fn add(&mut self, bucket: StarBucket) {
        self.counts[bucket.index()] += 1;
        self.total += 1;
    }

    pub fn count(&self, bucket: StarBucket) -> usize {
        self.counts[bucket.index()]
    }

    pub fn high_star_count(&self) -> usize {
        StarBucket::all()
            .filter(StarBucket::is_high_star)
            .map(|b| self.count(b))
            .sum()
    }
}

/// Percentage breakdown of a [`StarDistribution`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarPercentages {
    pub percentages: [f64; 5],
    /// Share of 4- and 5-star ratings.
    pub high_star_percentage: f64,
}

/// Score statistics for contracts holding one star bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarScoreStats {
    pub star: StarBucket,
    pub count: usize,
    pub avg_score: Option<f64>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
}

/// One cohort's view of one measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortDistribution {
    pub distribution: StarDistribution,
    pub percentages: StarPercentages,
    pub score_count: usize,
    pub avg_score: Option<f64>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub median_score: Option<f64>,
    pub score_quartiles: Quartiles,
    pub by_star: Vec<StarScoreStats>,
}

/// Focus vs. market distribution for one measure in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureDistribution {
    pub measure_code: MeasureCode,
    pub measure_name: Option<String>,
    pub domain: Option<String>,
    pub year: i32,
    pub focus: CohortDistribution,
    pub market: CohortDistribution,
}

/// Headline numbers for one cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortSummary {
    pub name: String,
    pub contract_count: usize,
    pub total_enrollment: u64,
}

/// Complete cohort comparison for a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionData {
    pub year: i32,
    pub focus: CohortSummary,
    pub market: CohortSummary,
    pub measures: Vec<MeasureDistribution>,
}
