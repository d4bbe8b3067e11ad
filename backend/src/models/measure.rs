use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::MeasureCode;

/// Measure metadata for one rating year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureMeta {
    pub code: MeasureCode,
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    pub year: i32,
}

impl MeasureMeta {
    /// Weight usable for aggregation: finite and strictly positive.
    pub fn usable_weight(&self) -> Option<f64> {
        self.weight.filter(|w| w.is_finite() && *w > 0.0)
    }
}

/// One resolved metadata entry per measure code.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MeasureCatalog {
    entries: BTreeMap<MeasureCode, MeasureMeta>,
}

impl MeasureCatalog {
    /// Resolve metadata across years; the most recent year's entry wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = MeasureMeta>,
    {
        let mut sorted: Vec<MeasureMeta> = entries.into_iter().collect();
        // Stable sort keeps source order among entries of the same year.
        sorted.sort_by(|a, b| b.year.cmp(&a.year));

        let mut resolved = BTreeMap::new();
        for meta in sorted {
            resolved.entry(meta.code.clone()).or_insert(meta);
        }

        Self { entries: resolved }
    }

    pub fn get(&self, code: &MeasureCode) -> Option<&MeasureMeta> {
        self.entries.get(code)
    }

    pub fn weight(&self, code: &MeasureCode) -> Option<f64> {
        self.get(code).and_then(MeasureMeta::usable_weight)
    }

    pub fn name(&self, code: &MeasureCode) -> Option<&str> {
        self.get(code).map(|m| m.name.as_str())
    }

    pub fn domain(&self, code: &MeasureCode) -> Option<&str> {
        self.get(code).and_then(|m| m.domain.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeasureMeta> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
