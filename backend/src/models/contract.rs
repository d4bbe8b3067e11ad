use serde::{Deserialize, Serialize};

use super::observation::{StarBucket, StarValue};
use crate::api::ContractId;

/// A Medicare Advantage contract for one rating year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: ContractId,
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub parent_organization: Option<String>,
    pub year: i32,
}

impl Contract {
    /// Case-insensitive, whitespace-tolerant organization match.
    pub fn belongs_to(&self, organization: &str) -> bool {
        let wanted = organization.trim();
        self.parent_organization
            .as_deref()
            .map(|org| org.trim().eq_ignore_ascii_case(wanted))
            .unwrap_or(false)
    }
}

/// Plan-level enrollment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEnrollment {
    pub contract_id: ContractId,
    pub plan_id: String,
    pub year: i32,
    #[serde(default)]
    pub enrollment: Option<u64>,
}

/// Official overall star rating for a contract/year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallRating {
    pub contract_id: ContractId,
    pub year: i32,
    #[serde(default)]
    pub overall_rating: Option<StarValue>,
}

impl OverallRating {
    /// Rated means the overall rating parses to a value that rounds into a
    /// star bucket, the same rule measure stars follow. The unrounded value is
    /// returned.
    pub fn rating(&self) -> Option<f64> {
        self.overall_rating
            .as_ref()
            .and_then(StarValue::as_f64)
            .filter(|r| StarBucket::from_rating(*r).is_some())
    }

    pub fn is_rated(&self) -> bool {
        self.rating().is_some()
    }
}
