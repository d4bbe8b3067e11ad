//! Order statistics and weighted aggregation helpers.
//!
//! Functions taking `sorted` expect ascending input; sorting is the caller's
//! job (see [`sorted_finite`]).

use serde::{Deserialize, Serialize};

/// Lower and upper quartile of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: Option<f64>,
    pub q3: Option<f64>,
}

/// Weighted mean and variance of one contract's measure ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedStats {
    pub mean: f64,
    pub variance: f64,
    pub total_weight: f64,
    pub count: usize,
}

/// Keep finite values and sort ascending.
pub fn sorted_finite<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Median of a sorted sample; `None` when empty.
pub fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 0 {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    } else {
        Some(sorted[n / 2])
    }
}

/// Quartiles as medians of the lower and upper halves.
///
/// With an odd count the middle element belongs to neither half.
pub fn quartiles(sorted: &[f64]) -> Quartiles {
    let n = sorted.len();
    if n < 2 {
        return Quartiles { q1: None, q3: None };
    }
    let lower = &sorted[..n / 2];
    let upper = &sorted[(n + 1) / 2..];
    Quartiles {
        q1: median(lower),
        q3: median(upper),
    }
}

/// Percent of the sample at or below `target`, rounded to 2 decimals.
///
/// Ties count toward the rank.
pub fn percentile_rank(sorted: &[f64], target: Option<f64>) -> Option<f64> {
    let target = target?;
    if sorted.is_empty() || target.is_nan() {
        return None;
    }
    let rank = sorted.partition_point(|v| *v <= target);
    Some(round_to(rank as f64 / sorted.len() as f64 * 100.0, 2))
}

/// Value at percentile `p` (0..=100), interpolating linearly between ranks.
pub fn percentile_value(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !p.is_finite() {
        return None;
    }
    let p = p.clamp(0.0, 100.0);
    let position = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

fn usable_pairs(pairs: &[(Option<f64>, f64)]) -> impl Iterator<Item = (f64, f64)> + '_ {
    pairs.iter().filter_map(|(value, weight)| {
        let value = (*value)?;
        (value.is_finite() && weight.is_finite() && *weight > 0.0).then_some((value, *weight))
    })
}

/// Weighted mean and (population) weighted variance.
///
/// Pairs with a missing or non-finite value, or a non-positive weight, are
/// skipped. Zero total weight yields `None`.
pub fn weighted_stats(pairs: &[(Option<f64>, f64)]) -> Option<WeightedStats> {
    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;
    let mut count = 0;
    for (value, weight) in usable_pairs(pairs) {
        total_weight += weight;
        weighted_sum += value * weight;
        count += 1;
    }

    if total_weight <= 0.0 {
        return None;
    }

    let mean = weighted_sum / total_weight;
    let variance = usable_pairs(pairs)
        .map(|(value, weight)| weight * (value - mean).powi(2))
        .sum::<f64>()
        / total_weight;

    Some(WeightedStats {
        mean,
        variance,
        total_weight,
        count,
    })
}

pub fn weighted_mean(pairs: &[(Option<f64>, f64)]) -> Option<f64> {
    weighted_stats(pairs).map(|s| s.mean)
}

pub fn weighted_variance(pairs: &[(Option<f64>, f64)]) -> Option<f64> {
    weighted_stats(pairs).map(|s| s.variance)
}

/// Share of `part` in `total` as a percentage; 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
