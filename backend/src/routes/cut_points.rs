use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::MeasureCode;
use crate::models::StarBucket;

// =========================================================
// Cut point types + route
// =========================================================

/// Empirical cut points for one measure.
///
/// Each star bucket maps to the minimum score observed among rated contracts
/// holding that bucket, or `null` when no contract holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutPointSet {
    pub measure_code: MeasureCode,
    pub measure_name: Option<String>,
    pub domain: Option<String>,
    pub star_cut_points: BTreeMap<StarBucket, Option<f64>>,
    pub sample_sizes: BTreeMap<StarBucket, usize>,
    pub total_contracts: usize,
}

impl CutPointSet {
    pub fn cut_point(&self, bucket: StarBucket) -> Option<f64> {
        self.star_cut_points.get(&bucket).copied().flatten()
    }

    pub fn populated_buckets(&self) -> usize {
        self.star_cut_points.values().filter(|c| c.is_some()).count()
    }

    /// A boundary needs data on at least two star levels.
    pub fn is_analyzable(&self) -> bool {
        self.populated_buckets() >= 2
    }
}

/// Cut points for every analyzable measure in a year.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutPointData {
    pub year: i32,
    pub rated_contracts: usize,
    pub measures: Vec<CutPointSet>,
    /// Measures with fewer than two populated star levels.
    pub excluded_measures: Vec<MeasureCode>,
}

impl CutPointData {
    pub fn get(&self, code: &MeasureCode) -> Option<&CutPointSet> {
        self.measures.iter().find(|m| &m.measure_code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(v: u8) -> StarBucket {
        StarBucket::new(v).unwrap()
    }

    #[test]
    fn test_cut_point_lookup() {
        let mut cut_points = BTreeMap::new();
        cut_points.insert(bucket(1), Some(10.0));
        cut_points.insert(bucket(2), None);
        let set = CutPointSet {
            measure_code: MeasureCode::new("C01"),
            measure_name: None,
            domain: None,
            star_cut_points: cut_points,
            sample_sizes: BTreeMap::new(),
            total_contracts: 2,
        };
        assert_eq!(set.cut_point(bucket(1)), Some(10.0));
        assert_eq!(set.cut_point(bucket(2)), None);
        assert_eq!(set.cut_point(bucket(5)), None);
        assert_eq!(set.populated_buckets(), 1);
        assert!(!set.is_analyzable());
    }

    #[test]
    fn test_serializes_bucket_keys_as_strings() {
        let mut cut_points = BTreeMap::new();
        cut_points.insert(bucket(3), Some(25.0));
        cut_points.insert(bucket(4), None);
        let set = CutPointSet {
            measure_code: MeasureCode::new("C01"),
            measure_name: Some("Breast Cancer Screening".to_string()),
            domain: None,
            star_cut_points: cut_points,
            sample_sizes: BTreeMap::new(),
            total_contracts: 1,
        };
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["starCutPoints"]["3"], 25.0);
        assert!(json["starCutPoints"]["4"].is_null());
        assert_eq!(json["measureCode"], "C01");
    }
}
