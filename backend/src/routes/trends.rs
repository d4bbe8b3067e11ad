use serde::{Deserialize, Serialize};

use crate::api::MeasureCode;

// =========================================================
// Year-over-year types + route
// =========================================================

/// Which cohort moved its high-star share further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementLeader {
    Focus,
    Market,
    Tie,
}

/// Change in 4-5 star share for one measure present in both years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureHighStarChange {
    pub measure_code: MeasureCode,
    pub measure_name: Option<String>,
    pub focus_from_percentage: f64,
    pub focus_to_percentage: f64,
    pub focus_change: f64,
    pub market_from_percentage: f64,
    pub market_to_percentage: f64,
    pub market_change: f64,
    pub improved_more: ImprovementLeader,
}

/// Year-over-year high-star movement for both cohorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighStarTrendData {
    pub from_year: i32,
    pub to_year: i32,
    pub focus_name: String,
    pub market_name: String,
    pub measures: Vec<MeasureHighStarChange>,
    pub focus_improved_more: usize,
    pub market_improved_more: usize,
    pub ties: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_serialization() {
        assert_eq!(
            serde_json::to_string(&ImprovementLeader::Focus).unwrap(),
            "\"focus\""
        );
        assert_eq!(
            serde_json::to_string(&ImprovementLeader::Tie).unwrap(),
            "\"tie\""
        );
    }
}
