use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of the loaded ratings dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    pub years: Vec<i32>,
    pub contract_count: usize,
    pub measure_count: usize,
    pub observation_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Parent organization with the number of contracts it holds in a year.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInfo {
    pub name: String,
    pub contract_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_info_omits_missing_provenance() {
        let info = DatasetInfo {
            years: vec![2024, 2025],
            contract_count: 3,
            measure_count: 2,
            observation_count: 6,
            checksum: None,
            loaded_at: None,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["contractCount"], 3);
        assert!(json.get("checksum").is_none());
        assert!(json.get("loadedAt").is_none());
    }
}
