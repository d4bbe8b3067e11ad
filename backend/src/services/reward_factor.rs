//! Reward Factor threshold engine.
//!
//! Each rated contract gets a weighted mean and variance of its measure star
//! ratings. Population percentiles of those two statistics place every
//! contract in a mean category and a variance category, and a fixed table maps
//! the pair to a Reward Factor. The whole computation runs twice: once over all
//! measures ("current") and once with a set of measures removed ("projected").

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::stats::{percentile_rank, percentile_value, round_to, sorted_finite, weighted_stats};
use crate::api::{
    CohortStats, ContractId, ContractRewardFactor, MeanCategory, MeasureCode, PercentileRanks,
    PercentileThresholds, RewardFactorData, RewardFactorMover, RewardFactorSummary,
    ThresholdComparison, ThresholdDifference, VarianceCategory,
};
use crate::config::{EngineConfig, RewardFactorTable};
use crate::db::models::YearSnapshot;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{MeasureCatalog, MetricObservation};

/// Highest overall rating a contract can hold.
pub const MAX_RATING: f64 = 5.0;

const CHANGE_EPSILON: f64 = 1e-9;

// =========================================================
// Per-contract statistics
// =========================================================

/// Weighted mean and variance of one contract's star ratings.
///
/// Observations without a star bucket, for excluded measures, or for measures
/// lacking a positive weight in the catalog do not contribute.
pub fn contract_cohort_stats<'a, I>(
    observations: I,
    catalog: &MeasureCatalog,
    excluded: &HashSet<MeasureCode>,
) -> CohortStats
where
    I: IntoIterator<Item = &'a MetricObservation>,
{
    let pairs: Vec<(Option<f64>, f64)> = observations
        .into_iter()
        .filter(|obs| !excluded.contains(&obs.measure_code))
        .filter_map(|obs| {
            let weight = catalog.weight(&obs.measure_code)?;
            Some((obs.star_bucket().map(|b| b.as_f64()), weight))
        })
        .collect();

    match weighted_stats(&pairs) {
        Some(stats) => CohortStats {
            weighted_mean: Some(stats.mean),
            weighted_variance: Some(stats.variance),
            measure_count: stats.count,
        },
        None => CohortStats::EMPTY,
    }
}

/// Population thresholds over the scored contracts; `None` when nobody is scored.
pub fn compute_thresholds<'a, I>(stats: I, config: &EngineConfig) -> Option<PercentileThresholds>
where
    I: IntoIterator<Item = &'a CohortStats>,
{
    let (means, variances): (Vec<f64>, Vec<f64>) = stats
        .into_iter()
        .filter_map(|s| Some((s.weighted_mean?, s.weighted_variance?)))
        .unzip();

    let means = sorted_finite(means);
    let variances = sorted_finite(variances);
    let [mean_low, mean_high] = config.mean_percentiles;
    let [variance_low, variance_high] = config.variance_percentiles;

    Some(PercentileThresholds {
        mean_65th: percentile_value(&means, mean_low)?,
        mean_85th: percentile_value(&means, mean_high)?,
        variance_30th: percentile_value(&variances, variance_low)?,
        variance_70th: percentile_value(&variances, variance_high)?,
    })
}

/// Sorted weighted means and variances of one pass, for percentile ranks.
struct CohortRanking {
    means: Vec<f64>,
    variances: Vec<f64>,
}

impl CohortRanking {
    fn new<'a, I>(stats: I) -> Self
    where
        I: IntoIterator<Item = &'a CohortStats>,
    {
        let (means, variances): (Vec<f64>, Vec<f64>) = stats
            .into_iter()
            .filter_map(|s| Some((s.weighted_mean?, s.weighted_variance?)))
            .unzip();
        CohortRanking {
            means: sorted_finite(means),
            variances: sorted_finite(variances),
        }
    }

    fn rank(&self, stats: &CohortStats) -> PercentileRanks {
        PercentileRanks {
            mean: percentile_rank(&self.means, stats.weighted_mean),
            variance: percentile_rank(&self.variances, stats.weighted_variance),
        }
    }
}

// =========================================================
// Classification
// =========================================================

pub fn mean_category(mean: f64, thresholds: &PercentileThresholds) -> MeanCategory {
    if mean >= thresholds.mean_85th {
        MeanCategory::High
    } else if mean >= thresholds.mean_65th {
        MeanCategory::RelativelyHigh
    } else {
        MeanCategory::Below
    }
}

/// Low variance is the desirable end.
pub fn variance_category(variance: f64, thresholds: &PercentileThresholds) -> VarianceCategory {
    if variance <= thresholds.variance_30th {
        VarianceCategory::Low
    } else if variance >= thresholds.variance_70th {
        VarianceCategory::High
    } else {
        VarianceCategory::Medium
    }
}

pub fn reward_factor(
    table: &RewardFactorTable,
    mean: MeanCategory,
    variance: VarianceCategory,
) -> f64 {
    let row = match mean {
        MeanCategory::High => &table.high,
        MeanCategory::RelativelyHigh => &table.relatively_high,
        MeanCategory::Below => &table.below,
    };
    match variance {
        VarianceCategory::Low => row[0],
        VarianceCategory::Medium => row[1],
        VarianceCategory::High => row[2],
    }
}

/// Categories and Reward Factor of one contract; unscored contracts get 0.
fn classify(
    stats: &CohortStats,
    thresholds: Option<&PercentileThresholds>,
    table: &RewardFactorTable,
) -> (Option<MeanCategory>, Option<VarianceCategory>, f64) {
    let (Some(mean), Some(variance), Some(thresholds)) =
        (stats.weighted_mean, stats.weighted_variance, thresholds)
    else {
        return (None, None, 0.0);
    };
    let m = mean_category(mean, thresholds);
    let v = variance_category(variance, thresholds);
    (Some(m), Some(v), reward_factor(table, m, v))
}

/// Round to the nearest half star.
pub fn round_half_star(rating: f64) -> f64 {
    (rating * 2.0).round() / 2.0
}

fn capped(rating: f64) -> f64 {
    rating.min(MAX_RATING)
}

// =========================================================
// Official threshold comparison
// =========================================================

fn threshold_difference(calculated: f64, official: f64) -> ThresholdDifference {
    let difference = calculated - official;
    ThresholdDifference {
        calculated,
        official,
        difference: round_to(difference, 4),
        percent_difference: (official != 0.0).then(|| round_to(difference / official * 100.0, 2)),
    }
}

/// Calculated minus official, per threshold.
pub fn compare_thresholds(
    calculated: &PercentileThresholds,
    official: &PercentileThresholds,
) -> ThresholdComparison {
    ThresholdComparison {
        mean_65th: threshold_difference(calculated.mean_65th, official.mean_65th),
        mean_85th: threshold_difference(calculated.mean_85th, official.mean_85th),
        variance_30th: threshold_difference(calculated.variance_30th, official.variance_30th),
        variance_70th: threshold_difference(calculated.variance_70th, official.variance_70th),
    }
}

// =========================================================
// Summary
// =========================================================

/// Histogram label of a Reward Factor change, e.g. `gained +0.2` or `lost -0.1`.
pub fn change_label(change: f64) -> String {
    if change > CHANGE_EPSILON {
        format!("gained +{:.1}", change)
    } else if change < -CHANGE_EPSILON {
        format!("lost {:.1}", change)
    } else {
        "unchanged".to_string()
    }
}

fn mover(contract: &ContractRewardFactor) -> RewardFactorMover {
    RewardFactorMover {
        contract_id: contract.contract_id.clone(),
        contract_name: contract.contract_name.clone(),
        current_r_factor: contract.current_r_factor,
        projected_r_factor: contract.projected_r_factor,
        r_factor_change: contract.r_factor_change,
    }
}

/// Gain/loss counts, average change, histogram and top movers.
///
/// Movers with equal change are ordered by contract id ascending.
pub fn summarize(contracts: &[ContractRewardFactor], top_n: usize) -> RewardFactorSummary {
    let mut change_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for c in contracts {
        *change_distribution
            .entry(change_label(c.r_factor_change))
            .or_default() += 1;
    }

    let mut gainers: Vec<&ContractRewardFactor> = contracts
        .iter()
        .filter(|c| c.r_factor_change > CHANGE_EPSILON)
        .collect();
    gainers.sort_by(|a, b| {
        b.r_factor_change
            .total_cmp(&a.r_factor_change)
            .then_with(|| a.contract_id.cmp(&b.contract_id))
    });

    let mut losers: Vec<&ContractRewardFactor> = contracts
        .iter()
        .filter(|c| c.r_factor_change < -CHANGE_EPSILON)
        .collect();
    losers.sort_by(|a, b| {
        a.r_factor_change
            .total_cmp(&b.r_factor_change)
            .then_with(|| a.contract_id.cmp(&b.contract_id))
    });

    let avg_r_factor_change = if contracts.is_empty() {
        0.0
    } else {
        contracts.iter().map(|c| c.r_factor_change).sum::<f64>() / contracts.len() as f64
    };

    RewardFactorSummary {
        total_contracts: contracts.len(),
        contracts_gaining_r_factor: gainers.len(),
        contracts_losing_r_factor: losers.len(),
        contracts_unchanged: contracts.len() - gainers.len() - losers.len(),
        avg_r_factor_change,
        change_distribution,
        top_gainers: gainers.into_iter().take(top_n).map(mover).collect(),
        top_losers: losers.into_iter().take(top_n).map(mover).collect(),
    }
}

// =========================================================
// Engine
// =========================================================

/// Normalize a list of measure codes to exclude: trimmed, deduplicated, sorted.
pub fn normalize_exclusions<I, S>(codes: I) -> Vec<MeasureCode>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .map(|c| MeasureCode::new(c.as_ref()))
        .filter(|c| !c.as_str().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Run the baseline and projected passes for every rated contract of a snapshot.
pub fn compute_reward_factor_data(
    snapshot: &YearSnapshot,
    excluded: &[MeasureCode],
    config: &EngineConfig,
) -> RewardFactorData {
    let excluded_set: HashSet<MeasureCode> = excluded.iter().cloned().collect();
    let no_exclusions = HashSet::new();
    let rated = snapshot.rated_contract_ids();

    let mut by_contract: BTreeMap<&ContractId, Vec<&MetricObservation>> = BTreeMap::new();
    for id in &rated {
        by_contract.entry(id).or_default();
    }
    for obs in &snapshot.observations {
        if obs.year == snapshot.year && rated.contains(&obs.contract_id) {
            by_contract.entry(&obs.contract_id).or_default().push(obs);
        }
    }

    let mut unscored_contracts = Vec::new();
    let mut scored: Vec<(&ContractId, CohortStats, CohortStats)> = Vec::new();
    for (id, observations) in &by_contract {
        let current = contract_cohort_stats(
            observations.iter().copied(),
            &snapshot.catalog,
            &no_exclusions,
        );
        if !current.is_scored() {
            unscored_contracts.push((*id).clone());
            continue;
        }
        let projected = contract_cohort_stats(
            observations.iter().copied(),
            &snapshot.catalog,
            &excluded_set,
        );
        scored.push((*id, current, projected));
    }

    let current_thresholds = compute_thresholds(scored.iter().map(|(_, c, _)| c), config);
    let projected_thresholds = compute_thresholds(scored.iter().map(|(_, _, p)| p), config);
    let current_ranking = CohortRanking::new(scored.iter().map(|(_, c, _)| c));
    let projected_ranking = CohortRanking::new(scored.iter().map(|(_, _, p)| p));

    let names = snapshot.contract_names();
    let official_ratings = snapshot.official_ratings();
    let table = &config.reward_table;

    let contracts: Vec<ContractRewardFactor> = scored
        .into_iter()
        .map(|(id, current, projected)| {
            let (current_mean_category, current_variance_category, current_r_factor) =
                classify(&current, current_thresholds.as_ref(), table);
            let (projected_mean_category, projected_variance_category, projected_r_factor) =
                classify(&projected, projected_thresholds.as_ref(), table);

            let current_rating = current.weighted_mean.map(|m| capped(m + current_r_factor));
            let final_projected = projected
                .weighted_mean
                .map(|m| capped(m + projected_r_factor));
            let current_rating_rounded = current_rating.map(round_half_star);
            let final_projected_rounded = final_projected.map(round_half_star);
            let star_bracket_change = match (current_rating_rounded, final_projected_rounded) {
                (Some(current), Some(projected)) => Some(((projected - current) * 2.0).round() as i32),
                _ => None,
            };

            ContractRewardFactor {
                contract_id: id.clone(),
                contract_name: names.get(id).cloned(),
                current_percentiles: current_ranking.rank(&current),
                projected_percentiles: projected_ranking.rank(&projected),
                current,
                projected,
                current_mean_category,
                current_variance_category,
                projected_mean_category,
                projected_variance_category,
                current_r_factor,
                projected_r_factor,
                r_factor_change: round_to(projected_r_factor - current_r_factor, 1),
                current_rating,
                current_rating_rounded,
                projected_rating_without_measures: projected.weighted_mean,
                final_projected,
                final_projected_rounded,
                star_bracket_change,
                official_rating: official_ratings.get(id).copied(),
            }
        })
        .collect();

    let summary = summarize(&contracts, config.top_movers);
    let threshold_comparison = match (current_thresholds.as_ref(), snapshot.official_thresholds.as_ref()) {
        (Some(calculated), Some(official)) => Some(compare_thresholds(calculated, official)),
        _ => None,
    };

    log::info!(
        "Reward Factor {}: {} contracts scored, {} unscored, {} gaining, {} losing (excluded: {:?})",
        snapshot.year,
        summary.total_contracts,
        unscored_contracts.len(),
        summary.contracts_gaining_r_factor,
        summary.contracts_losing_r_factor,
        excluded.iter().map(MeasureCode::as_str).collect::<Vec<_>>()
    );

    RewardFactorData {
        year: snapshot.year,
        excluded_measures: excluded.to_vec(),
        current_thresholds,
        projected_thresholds,
        official_thresholds: snapshot.official_thresholds,
        threshold_comparison,
        contracts,
        unscored_contracts,
        summary,
    }
}

/// Get Reward Factor projections for a year with `excluded` measures removed.
pub async fn get_reward_factor_data<R: FullRepository + ?Sized>(
    repo: &R,
    year: i32,
    excluded: Vec<MeasureCode>,
    config: &EngineConfig,
) -> RepositoryResult<RewardFactorData> {
    let snapshot = crate::db::services::load_year_snapshot(repo, year).await?;
    let config = config.clone();
    let data = tokio::task::spawn_blocking(move || {
        let excluded = normalize_exclusions(excluded.iter().map(MeasureCode::as_str));
        compute_reward_factor_data(&snapshot, &excluded, &config)
    })
    .await?;
    Ok(data)
}
