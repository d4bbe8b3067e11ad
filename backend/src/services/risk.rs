//! Risk / opportunity classification against empirical cut points.
//!
//! An observation is at risk when its score sits within the proximity
//! threshold above the cut point of its own star level, and an opportunity
//! when it sits within the threshold below the next level's cut point. Both
//! flags can hold at once.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::cut_points::compute_cut_point_data;
use super::stats::round_to;
use crate::api::{
    ContractClassification, ContractId, ContractRiskSummary, CutPointData, CutPointSet,
    RiskOpportunityData,
};
use crate::config::EngineConfig;
use crate::db::models::YearSnapshot;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::MetricObservation;

/// Whether a measure belongs to the HEDIS family.
pub fn is_hedis_measure(code: &str, domain: Option<&str>, config: &EngineConfig) -> bool {
    let domain_match = domain
        .map(|d| d.to_ascii_uppercase().contains("HEDIS"))
        .unwrap_or(false);
    domain_match || config.is_hedis_code(code)
}

/// Classify one observation against its measure's cut points.
///
/// Returns `None` when the observation lacks a star bucket or a finite score.
/// The returned classification may carry neither flag.
pub fn classify_observation(
    obs: &MetricObservation,
    cut_points: &CutPointSet,
    config: &EngineConfig,
) -> Option<ContractClassification> {
    let star = obs.star_bucket()?;
    let score = obs.score()?;
    let threshold = config.proximity_threshold;

    let lower_cut_point = cut_points.cut_point(star);
    let upper_cut_point = star.next().and_then(|next| cut_points.cut_point(next));

    let risk_distance = lower_cut_point
        .map(|lower| score - lower)
        .filter(|d| (0.0..=threshold).contains(d));
    let opportunity_distance = upper_cut_point
        .map(|upper| upper - score)
        .filter(|d| *d > 0.0 && *d <= threshold);

    let code = cut_points.measure_code.as_str();
    Some(ContractClassification {
        measure_code: cut_points.measure_code.clone(),
        measure_name: cut_points.measure_name.clone(),
        domain: cut_points.domain.clone(),
        score,
        star_rating: star,
        lower_cut_point,
        upper_cut_point,
        is_risk: risk_distance.is_some(),
        risk_points: risk_distance.map(|d| round_to(d, 1)),
        is_opportunity: opportunity_distance.is_some(),
        opportunity_points: opportunity_distance.map(|d| round_to(d, 1)),
        is_hedis: is_hedis_measure(code, cut_points.domain.as_deref(), config),
        is_pharmacy: cut_points.measure_code.is_part_d(),
    })
}

fn by_proximity(
    points: impl Fn(&ContractClassification) -> Option<f64>,
) -> impl Fn(&ContractClassification, &ContractClassification) -> std::cmp::Ordering {
    move |a: &ContractClassification, b: &ContractClassification| {
        let pa = points(a).unwrap_or(f64::INFINITY);
        let pb = points(b).unwrap_or(f64::INFINITY);
        pa.total_cmp(&pb)
            .then_with(|| a.measure_code.cmp(&b.measure_code))
    }
}

/// Classify every observation of the cohort and group flags by contract.
///
/// Every cohort contract appears in the output, sorted by id, even when no
/// measure is flagged. Measures without an analyzable cut point set are skipped.
pub fn classify_cohort(
    observations: &[MetricObservation],
    cohort: &BTreeSet<ContractId>,
    cut_points: &CutPointData,
    contract_names: &HashMap<ContractId, String>,
    config: &EngineConfig,
) -> Vec<ContractRiskSummary> {
    let analyzable: HashMap<_, _> = cut_points
        .measures
        .iter()
        .filter(|set| set.is_analyzable())
        .map(|set| (&set.measure_code, set))
        .collect();

    let mut grouped: BTreeMap<&ContractId, (Vec<ContractClassification>, Vec<ContractClassification>)> =
        cohort.iter().map(|id| (id, (Vec::new(), Vec::new()))).collect();

    for obs in observations {
        if obs.year != cut_points.year {
            continue;
        }
        let Some((risks, opportunities)) = grouped.get_mut(&obs.contract_id) else {
            continue;
        };
        let Some(set) = analyzable.get(&obs.measure_code) else {
            continue;
        };
        let Some(classification) = classify_observation(obs, set, config) else {
            continue;
        };

        if classification.is_opportunity {
            opportunities.push(classification.clone());
        }
        if classification.is_risk {
            risks.push(classification);
        }
    }

    grouped
        .into_iter()
        .map(|(id, (mut risk_measures, mut opportunity_measures))| {
            risk_measures.sort_by(by_proximity(|c| c.risk_points));
            opportunity_measures.sort_by(by_proximity(|c| c.opportunity_points));
            ContractRiskSummary {
                contract_id: id.clone(),
                contract_name: contract_names.get(id).cloned(),
                risk_count: risk_measures.len(),
                opportunity_count: opportunity_measures.len(),
                risk_measures,
                opportunity_measures,
            }
        })
        .collect()
}

/// Risk / opportunity report for one organization, or for every rated contract.
pub fn compute_risk_opportunity_data(
    snapshot: &YearSnapshot,
    organization: Option<&str>,
    config: &EngineConfig,
) -> RiskOpportunityData {
    let cut_points = compute_cut_point_data(snapshot);

    let cohort: BTreeSet<ContractId> = match organization {
        Some(org) => snapshot.organization_contract_ids(org).into_iter().collect(),
        None => snapshot.rated_contract_ids().into_iter().collect(),
    };

    let contracts = classify_cohort(
        &snapshot.observations,
        &cohort,
        &cut_points,
        &snapshot.contract_names(),
        config,
    );

    RiskOpportunityData {
        year: snapshot.year,
        organization: organization.map(|o| o.trim().to_string()),
        proximity_threshold: config.proximity_threshold,
        analyzed_measures: cut_points.measures.len(),
        total_risk: contracts.iter().map(|c| c.risk_count).sum(),
        total_opportunity: contracts.iter().map(|c| c.opportunity_count).sum(),
        contracts_with_risk: contracts.iter().filter(|c| c.risk_count > 0).count(),
        contracts_with_opportunity: contracts.iter().filter(|c| c.opportunity_count > 0).count(),
        contracts,
    }
}

/// Get risk / opportunity data for a year.
pub async fn get_risk_opportunity_data<R: FullRepository + ?Sized>(
    repo: &R,
    year: i32,
    organization: Option<String>,
    config: &EngineConfig,
) -> RepositoryResult<RiskOpportunityData> {
    let snapshot = crate::db::services::load_year_snapshot(repo, year).await?;
    let config = config.clone();
    let data = tokio::task::spawn_blocking(move || {
        compute_risk_opportunity_data(&snapshot, organization.as_deref(), &config)
    })
    .await?;
    Ok(data)
}
