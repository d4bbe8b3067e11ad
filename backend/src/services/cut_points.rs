//! Empirical cut point derivation.
//!
//! For every measure, the cut point of a star level is the lowest score any
//! rated contract achieved while holding that level.

use std::collections::{BTreeMap, HashSet};

use crate::api::{ContractId, CutPointData, CutPointSet, MeasureCode};
use crate::db::models::YearSnapshot;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{MeasureCatalog, MetricObservation, StarBucket};

/// Derive cut points for one year from observations of rated contracts.
///
/// Observations from another year, from contracts outside `rated`, or lacking
/// either a star bucket or a finite score do not contribute. Measures with
/// data on fewer than two star levels are listed in `excluded_measures`.
pub fn derive_cut_points(
    observations: &[MetricObservation],
    rated: &HashSet<ContractId>,
    catalog: &MeasureCatalog,
    year: i32,
) -> CutPointData {
    let mut scores: BTreeMap<&MeasureCode, BTreeMap<StarBucket, Vec<f64>>> = BTreeMap::new();

    for obs in observations {
        if obs.year != year || !rated.contains(&obs.contract_id) {
            continue;
        }
        let (Some(bucket), Some(score)) = (obs.star_bucket(), obs.score()) else {
            continue;
        };
        scores
            .entry(&obs.measure_code)
            .or_default()
            .entry(bucket)
            .or_default()
            .push(score);
    }

    let mut measures = Vec::new();
    let mut excluded_measures = Vec::new();

    for (code, by_bucket) in scores {
        let set = build_cut_point_set(code, &by_bucket, catalog);
        if set.is_analyzable() {
            measures.push(set);
        } else {
            log::debug!(
                "Measure {} has data on {} star level(s); excluded from cut point analysis",
                code,
                set.populated_buckets()
            );
            excluded_measures.push(code.clone());
        }
    }

    CutPointData {
        year,
        rated_contracts: rated.len(),
        measures,
        excluded_measures,
    }
}

fn build_cut_point_set(
    code: &MeasureCode,
    by_bucket: &BTreeMap<StarBucket, Vec<f64>>,
    catalog: &MeasureCatalog,
) -> CutPointSet {
    let mut star_cut_points = BTreeMap::new();
    let mut sample_sizes = BTreeMap::new();

    for bucket in StarBucket::all() {
        let bucket_scores = by_bucket.get(&bucket).map(Vec::as_slice).unwrap_or(&[]);
        let minimum = bucket_scores.iter().copied().reduce(f64::min);
        star_cut_points.insert(bucket, minimum);
        sample_sizes.insert(bucket, bucket_scores.len());
    }

    CutPointSet {
        measure_code: code.clone(),
        measure_name: catalog.name(code).map(str::to_string),
        domain: catalog.domain(code).map(str::to_string),
        total_contracts: sample_sizes.values().sum(),
        star_cut_points,
        sample_sizes,
    }
}

/// Cut points over the rated contracts of a snapshot.
pub fn compute_cut_point_data(snapshot: &YearSnapshot) -> CutPointData {
    derive_cut_points(
        &snapshot.observations,
        &snapshot.rated_contract_ids(),
        &snapshot.catalog,
        snapshot.year,
    )
}

/// Get cut point data for a year.
pub async fn get_cut_point_data<R: FullRepository + ?Sized>(
    repo: &R,
    year: i32,
) -> RepositoryResult<CutPointData> {
    let snapshot = crate::db::services::load_year_snapshot(repo, year).await?;
    let data = tokio::task::spawn_blocking(move || compute_cut_point_data(&snapshot)).await?;
    Ok(data)
}
