use serde::{Deserialize, Serialize};

use crate::api::{ContractId, MeasureCode};

/// Rounded star rating in the closed range 1..=5.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StarBucket(u8);

impl StarBucket {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// All buckets in ascending order.
    pub fn all() -> impl Iterator<Item = StarBucket> {
        (Self::MIN..=Self::MAX).map(StarBucket)
    }

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then_some(StarBucket(value))
    }

    /// Round a raw rating half-up to the nearest integer bucket.
    ///
    /// Values that round outside 1..=5 are rejected, not clamped.
    pub fn from_rating(rating: f64) -> Option<Self> {
        if !rating.is_finite() {
            return None;
        }
        let rounded = (rating + 0.5).floor();
        if rounded < Self::MIN as f64 || rounded > Self::MAX as f64 {
            return None;
        }
        Some(StarBucket(rounded as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    /// Zero-based position, handy for fixed `[_; 5]` histograms.
    pub fn index(&self) -> usize {
        (self.0 - Self::MIN) as usize
    }

    /// The bucket one tier up, `None` at the top.
    pub fn next(&self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    pub fn is_high_star(&self) -> bool {
        self.0 >= 4
    }
}

impl TryFrom<u8> for StarBucket {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        StarBucket::new(value).ok_or_else(|| format!("Star bucket out of range: {}", value))
    }
}

impl From<StarBucket> for u8 {
    fn from(bucket: StarBucket) -> Self {
        bucket.0
    }
}

impl std::fmt::Display for StarBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A star rating as delivered by the source: either numeric or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StarValue {
    Number(f64),
    Text(String),
}

impl StarValue {
    /// Numeric value, parsing text the way `parseFloat` does.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            StarValue::Number(n) => Some(*n),
            StarValue::Text(s) => parse_float_prefix(s),
        };
        value.filter(|v| v.is_finite())
    }

    pub fn bucket(&self) -> Option<StarBucket> {
        self.as_f64().and_then(StarBucket::from_rating)
    }
}

impl From<f64> for StarValue {
    fn from(value: f64) -> Self {
        StarValue::Number(value)
    }
}

impl From<&str> for StarValue {
    fn from(value: &str) -> Self {
        StarValue::Text(value.to_string())
    }
}

/// Parse the longest leading decimal literal, skipping leading whitespace.
///
/// `"4 stars"` parses as `4.0`; `"Plan too new"` yields `None`.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }

    if mantissa_digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// One (contract, measure, year) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricObservation {
    pub contract_id: ContractId,
    pub measure_code: MeasureCode,
    #[serde(default)]
    pub star_rating: Option<StarValue>,
    #[serde(default)]
    pub rate_percent: Option<f64>,
    pub year: i32,
}

impl MetricObservation {
    pub fn new(
        contract_id: impl Into<ContractId>,
        measure_code: impl Into<MeasureCode>,
        star_rating: Option<StarValue>,
        rate_percent: Option<f64>,
        year: i32,
    ) -> Self {
        Self {
            contract_id: contract_id.into(),
            measure_code: measure_code.into(),
            star_rating,
            rate_percent,
            year,
        }
    }

    pub fn star_bucket(&self) -> Option<StarBucket> {
        self.star_rating.as_ref().and_then(StarValue::bucket)
    }

    /// Rate percent when present and finite.
    pub fn score(&self) -> Option<f64> {
        self.rate_percent.filter(|v| v.is_finite())
    }

    /// Usable when at least one of star bucket or score is valid.
    pub fn is_usable(&self) -> bool {
        self.star_bucket().is_some() || self.score().is_some()
    }
}
