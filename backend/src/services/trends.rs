//! Year-over-year change in 4-5 star share, focus organization vs. market.

use std::collections::HashMap;

use super::compare::compute_distribution_data;
use super::stats::round_to;
use crate::api::{
    DistributionData, HighStarTrendData, ImprovementLeader, MeasureDistribution,
    MeasureHighStarChange,
};
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::db::services::{list_years, load_year_snapshot};

const TIE_EPSILON: f64 = 1e-9;

fn leader(focus_change: f64, market_change: f64) -> ImprovementLeader {
    let delta = focus_change - market_change;
    if delta > TIE_EPSILON {
        ImprovementLeader::Focus
    } else if delta < -TIE_EPSILON {
        ImprovementLeader::Market
    } else {
        ImprovementLeader::Tie
    }
}

fn measure_change(from: &MeasureDistribution, to: &MeasureDistribution) -> MeasureHighStarChange {
    let focus_from = from.focus.percentages.high_star_percentage;
    let focus_to = to.focus.percentages.high_star_percentage;
    let market_from = from.market.percentages.high_star_percentage;
    let market_to = to.market.percentages.high_star_percentage;
    let focus_change = round_to(focus_to - focus_from, 2);
    let market_change = round_to(market_to - market_from, 2);

    MeasureHighStarChange {
        measure_code: to.measure_code.clone(),
        measure_name: to.measure_name.clone().or_else(|| from.measure_name.clone()),
        focus_from_percentage: focus_from,
        focus_to_percentage: focus_to,
        focus_change,
        market_from_percentage: market_from,
        market_to_percentage: market_to,
        market_change,
        improved_more: leader(focus_change, market_change),
    }
}

/// Compare two years' distributions over the measures present in both.
pub fn compute_high_star_trends(from: &DistributionData, to: &DistributionData) -> HighStarTrendData {
    let earlier: HashMap<_, _> = from
        .measures
        .iter()
        .map(|m| (&m.measure_code, m))
        .collect();

    let measures: Vec<MeasureHighStarChange> = to
        .measures
        .iter()
        .filter_map(|later| {
            earlier
                .get(&later.measure_code)
                .map(|earlier| measure_change(earlier, later))
        })
        .collect();

    let count = |wanted: ImprovementLeader| {
        measures
            .iter()
            .filter(|m| m.improved_more == wanted)
            .count()
    };

    HighStarTrendData {
        from_year: from.year,
        to_year: to.year,
        focus_name: to.focus.name.clone(),
        market_name: to.market.name.clone(),
        focus_improved_more: count(ImprovementLeader::Focus),
        market_improved_more: count(ImprovementLeader::Market),
        ties: count(ImprovementLeader::Tie),
        measures,
    }
}

fn require_year(years: &[i32], year: i32) -> RepositoryResult<i32> {
    if years.binary_search(&year).is_ok() {
        Ok(year)
    } else {
        Err(RepositoryError::year_not_found(year, "resolve_trend_years"))
    }
}

/// Pick the comparison years: explicit values win, otherwise the two most recent years.
///
/// Explicit years must be present in `available`.
pub fn resolve_trend_years(
    available: &[i32],
    from: Option<i32>,
    to: Option<i32>,
) -> RepositoryResult<(i32, i32)> {
    let mut years = available.to_vec();
    years.sort_unstable();
    years.dedup();

    let to = match to {
        Some(year) => require_year(&years, year)?,
        None => *years
            .last()
            .ok_or_else(|| RepositoryError::not_found("No rating years available"))?,
    };
    let from = match from {
        Some(year) => require_year(&years, year)?,
        None => years
            .iter()
            .rev()
            .copied()
            .find(|y| *y < to)
            .ok_or_else(|| {
                RepositoryError::not_found(format!("No rating year before {} available", to))
            })?,
    };

    if from >= to {
        return Err(RepositoryError::validation(format!(
            "from year ({}) must be earlier than to year ({})",
            from, to
        )));
    }
    Ok((from, to))
}

/// Get the high-star trend of an organization between two years.
pub async fn get_high_star_trends<R: FullRepository + ?Sized>(
    repo: &R,
    organization: String,
    from: Option<i32>,
    to: Option<i32>,
) -> RepositoryResult<HighStarTrendData> {
    let (from, to) = resolve_trend_years(&list_years(repo).await?, from, to)?;

    let earlier = load_year_snapshot(repo, from).await?;
    let later = load_year_snapshot(repo, to).await?;

    let data = tokio::task::spawn_blocking(move || {
        let from_data = compute_distribution_data(&earlier, &organization);
        let to_data = compute_distribution_data(&later, &organization);
        compute_high_star_trends(&from_data, &to_data)
    })
    .await?;
    Ok(data)
}
