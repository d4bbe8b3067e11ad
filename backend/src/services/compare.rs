//! Focus-organization vs. rest-of-market star distributions.

use std::collections::{BTreeMap, HashSet};

use super::stats::{median, percentage, quartiles, round_to, sorted_finite};
use crate::api::{
    CohortDistribution, CohortSummary, ContractId, DistributionData, MeasureCode,
    MeasureDistribution, StarDistribution, StarPercentages, StarScoreStats,
};
use crate::db::models::YearSnapshot;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{MetricObservation, StarBucket};

/// Display name of the cohort holding every rated contract outside the focus organization.
pub const MARKET_COHORT_NAME: &str = "Rest of market";

/// Percentages per star bucket, rounded to 2 decimals; all zero for an empty histogram.
pub fn calculate_percentages(distribution: &StarDistribution) -> StarPercentages {
    let total = distribution.total;
    let mut percentages = [0.0; 5];
    for bucket in StarBucket::all() {
        percentages[bucket.index()] = round_to(percentage(distribution.count(bucket), total), 2);
    }
    StarPercentages {
        percentages,
        high_star_percentage: round_to(percentage(distribution.high_star_count(), total), 2),
    }
}

#[derive(Default)]
struct ScoreAccumulator {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl ScoreAccumulator {
    fn push(&mut self, score: f64) {
        self.count += 1;
        self.sum += score;
        self.min = Some(self.min.map_or(score, |m| m.min(score)));
        self.max = Some(self.max.map_or(score, |m| m.max(score)));
    }

    fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| round_to(self.sum / self.count as f64, 2))
    }
}

/// Histogram and score statistics for one cohort's observations of one measure.
pub fn cohort_distribution<'a, I>(observations: I) -> CohortDistribution
where
    I: IntoIterator<Item = &'a MetricObservation>,
{
    let mut distribution = StarDistribution::default();
    let mut overall = ScoreAccumulator::default();
    let mut scores = Vec::new();
    let mut per_star: [ScoreAccumulator; 5] = Default::default();
    let mut star_counts = [0usize; 5];

    for obs in observations {
        let bucket = obs.star_bucket();
        if let Some(bucket) = bucket {
            distribution.add(bucket);
            star_counts[bucket.index()] += 1;
        }
        if let Some(score) = obs.score() {
            overall.push(score);
            scores.push(score);
            if let Some(bucket) = bucket {
                per_star[bucket.index()].push(score);
            }
        }
    }

    let by_star = StarBucket::all()
        .map(|bucket| {
            let acc = &per_star[bucket.index()];
            StarScoreStats {
                star: bucket,
                count: star_counts[bucket.index()],
                avg_score: acc.average(),
                min_score: acc.min,
                max_score: acc.max,
            }
        })
        .collect();

    let scores = sorted_finite(scores);
    CohortDistribution {
        median_score: median(&scores),
        score_quartiles: quartiles(&scores),
        percentages: calculate_percentages(&distribution),
        distribution,
        score_count: overall.count,
        avg_score: overall.average(),
        min_score: overall.min,
        max_score: overall.max,
        by_star,
    }
}

/// Split a snapshot's rated contracts into the focus organization and the rest.
pub fn split_cohorts(
    snapshot: &YearSnapshot,
    organization: &str,
) -> (HashSet<ContractId>, HashSet<ContractId>) {
    let rated = snapshot.rated_contract_ids();
    let organization_ids = snapshot.organization_contract_ids(organization);
    rated
        .into_iter()
        .partition(|id| organization_ids.contains(id))
}

/// Per-measure distributions of a focus organization against the rest of the market.
///
/// Only rated contracts take part. Measures are ordered by code.
pub fn compute_distribution_data(snapshot: &YearSnapshot, organization: &str) -> DistributionData {
    let (focus, market) = split_cohorts(snapshot, organization);

    let mut by_measure: BTreeMap<&MeasureCode, (Vec<&MetricObservation>, Vec<&MetricObservation>)> =
        BTreeMap::new();
    for obs in &snapshot.observations {
        if obs.year != snapshot.year {
            continue;
        }
        let in_focus = focus.contains(&obs.contract_id);
        if !in_focus && !market.contains(&obs.contract_id) {
            continue;
        }
        let entry = by_measure.entry(&obs.measure_code).or_default();
        if in_focus {
            entry.0.push(obs);
        } else {
            entry.1.push(obs);
        }
    }

    let measures = by_measure
        .into_iter()
        .map(|(code, (focus_obs, market_obs))| MeasureDistribution {
            measure_code: code.clone(),
            measure_name: snapshot.catalog.name(code).map(str::to_string),
            domain: snapshot.catalog.domain(code).map(str::to_string),
            year: snapshot.year,
            focus: cohort_distribution(focus_obs),
            market: cohort_distribution(market_obs),
        })
        .collect();

    DistributionData {
        year: snapshot.year,
        focus: CohortSummary {
            name: organization.trim().to_string(),
            contract_count: focus.len(),
            total_enrollment: snapshot.total_enrollment(&focus),
        },
        market: CohortSummary {
            name: MARKET_COHORT_NAME.to_string(),
            contract_count: market.len(),
            total_enrollment: snapshot.total_enrollment(&market),
        },
        measures,
    }
}

/// Get focus vs. market distributions for a year.
pub async fn get_distribution_data<R: FullRepository + ?Sized>(
    repo: &R,
    year: i32,
    organization: String,
) -> RepositoryResult<DistributionData> {
    let snapshot = crate::db::services::load_year_snapshot(repo, year).await?;
    let data =
        tokio::task::spawn_blocking(move || compute_distribution_data(&snapshot, &organization))
            .await?;
    Ok(data)
}
