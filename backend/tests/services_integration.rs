//! Integration tests for the analytics services over a LocalRepository.

mod support;

use ma_stars::api::{ContractId, ImprovementLeader, MeanCategory, MeasureCode, VarianceCategory};
use ma_stars::config::EngineConfig;
use ma_stars::db::{services as db_services, RepositoryError};
use ma_stars::models::StarBucket;
use ma_stars::services;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn star(value: u8) -> StarBucket {
    StarBucket::new(value).unwrap()
}

// =========================================================
// Dataset
// =========================================================

#[tokio::test]
async fn test_sample_dataset_info() {
    let repo = support::sample_repository();
    let info = db_services::dataset_info(&repo).await.unwrap();
    assert_eq!(info.years, vec![2024, 2025]);
    assert_eq!(info.contract_count, 5);
    assert_eq!(info.measure_count, 2);
    assert_eq!(info.checksum.as_deref().map(str::len), Some(64));
    assert!(info.loaded_at.is_some());
}

#[tokio::test]
async fn test_rated_contracts_skip_text_ratings() {
    let repo = support::sample_repository();
    let rated = db_services::rated_contract_ids(&repo, 2025).await.unwrap();
    assert_eq!(rated.len(), 4);
    assert!(!rated.contains(&ContractId::from("H005")));
}

#[tokio::test]
async fn test_list_organizations() {
    let repo = support::sample_repository();
    let orgs = db_services::list_organizations(&repo, 2025).await.unwrap();
    let names: Vec<&str> = orgs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Acme Health", "Beta", "Other Care Inc"]);
    assert_eq!(orgs[0].contract_count, 2);
}

// =========================================================
// Cut points
// =========================================================

#[tokio::test]
async fn test_cut_points_from_rated_contracts() {
    let repo = support::sample_repository();
    let data = services::get_cut_point_data(&repo, 2025).await.unwrap();

    assert_eq!(data.rated_contracts, 4);
    assert!(data.excluded_measures.is_empty());

    let c01 = data.get(&MeasureCode::from("C01")).unwrap();
    assert_eq!(c01.cut_point(star(1)), None);
    assert_eq!(c01.cut_point(star(3)), Some(68.0));
    assert_eq!(c01.cut_point(star(4)), Some(69.5));
    assert_eq!(c01.cut_point(star(5)), Some(82.0));
    // H005 is unrated and must not create a 1-star cut point
    assert_eq!(c01.total_contracts, 4);
    assert_eq!(c01.measure_name.as_deref(), Some("Breast Cancer Screening"));

    let d01 = data.get(&MeasureCode::from("D01")).unwrap();
    assert_eq!(d01.cut_point(star(2)), Some(40.0));
    assert_eq!(d01.cut_point(star(4)), Some(80.0));
    assert_eq!(d01.total_contracts, 3);
}

#[tokio::test]
async fn test_cut_points_unhealthy_repository() {
    let repo = support::sample_repository();
    repo.set_healthy(false);
    let err = services::get_cut_point_data(&repo, 2025).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ConnectionError { .. }));
}

// =========================================================
// Risk / opportunity
// =========================================================

#[tokio::test]
async fn test_risk_for_organization() {
    let repo = support::sample_repository();
    let config = EngineConfig::default();
    let data = services::get_risk_opportunity_data(
        &repo,
        2025,
        Some("acme health".to_string()),
        &config,
    )
    .await
    .unwrap();

    assert_eq!(data.organization.as_deref(), Some("acme health"));
    assert_eq!(data.analyzed_measures, 2);
    assert_eq!(data.contracts.len(), 2);
    assert_eq!(data.total_risk, 3);
    assert_eq!(data.total_opportunity, 0);
    assert_eq!(data.contracts_with_risk, 2);

    let h001 = &data.contracts[0];
    assert_eq!(h001.contract_id.as_str(), "H001");
    let codes: Vec<&str> = h001
        .risk_measures
        .iter()
        .map(|c| c.measure_code.as_str())
        .collect();
    assert_eq!(codes, vec!["C01", "D01"]);
    assert!(h001.risk_measures[0].is_hedis);
    assert!(h001.risk_measures[1].is_pharmacy);

    let h002 = &data.contracts[1];
    assert_eq!(h002.risk_count, 1);
    assert_eq!(h002.risk_measures[0].risk_points, Some(1.5));
    assert_eq!(h002.risk_measures[0].lower_cut_point, Some(69.5));
}

#[tokio::test]
async fn test_risk_for_whole_market() {
    let repo = support::sample_repository();
    let data = services::get_risk_opportunity_data(&repo, 2025, None, &EngineConfig::default())
        .await
        .unwrap();

    assert!(data.organization.is_none());
    assert_eq!(data.contracts.len(), 4);
    let h003 = data
        .contracts
        .iter()
        .find(|c| c.contract_id.as_str() == "H003")
        .unwrap();
    assert_eq!(h003.opportunity_count, 1);
    let opportunity = &h003.opportunity_measures[0];
    assert_eq!(opportunity.measure_code.as_str(), "C01");
    assert_eq!(opportunity.opportunity_points, Some(1.5));
    assert_eq!(opportunity.upper_cut_point, Some(69.5));
    // At its own 3-star floor, so also at risk
    assert!(opportunity.is_risk);
}

#[tokio::test]
async fn test_risk_tighter_proximity() {
    let repo = support::sample_repository();
    let config = EngineConfig {
        proximity_threshold: 1.0,
        ..EngineConfig::default()
    };
    let data =
        services::get_risk_opportunity_data(&repo, 2025, Some("Acme Health".to_string()), &config)
            .await
            .unwrap();
    assert_eq!(data.proximity_threshold, 1.0);
    // H002's 1.5 point margin no longer counts
    assert_eq!(data.contracts[1].risk_count, 0);
}

// =========================================================
// Reward Factor
// =========================================================

#[tokio::test]
async fn test_reward_factor_projection_scenario() {
    let repo = support::reward_factor_repository();
    let data = services::get_reward_factor_data(
        &repo,
        2025,
        vec![MeasureCode::from("X")],
        &EngineConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(data.excluded_measures, vec![MeasureCode::from("X")]);
    assert_eq!(data.contracts.len(), 10);
    assert!(data.unscored_contracts.is_empty());

    let current = data.current_thresholds.unwrap();
    assert!(approx(current.mean_65th, 11.0 / 3.0));
    assert!(approx(current.variance_30th, 2.0));
    let projected = data.projected_thresholds.unwrap();
    assert!(approx(projected.mean_85th, 4.0));
    assert!(approx(projected.variance_30th, 0.0));

    for contract in &data.contracts {
        assert_eq!(contract.current_r_factor, 0.0, "{}", contract.contract_id.as_str());
    }

    let h01 = &data.contracts[0];
    assert_eq!(h01.contract_id.as_str(), "H01");
    assert_eq!(h01.projected_mean_category, Some(MeanCategory::High));
    assert_eq!(h01.projected_variance_category, Some(VarianceCategory::Low));
    assert_eq!(h01.projected_r_factor, 0.4);
    assert_eq!(h01.r_factor_change, 0.4);
    assert_eq!(h01.current_rating_rounded, Some(3.0));
    assert!(approx(h01.final_projected.unwrap(), 4.4));
    assert_eq!(h01.final_projected_rounded, Some(4.5));
    assert_eq!(h01.star_bracket_change, Some(3));
    assert_eq!(h01.official_rating, Some(3.5));
    assert_eq!(h01.current_percentiles.mean, Some(50.0));
    assert_eq!(h01.current_percentiles.variance, Some(50.0));
    assert_eq!(h01.projected_percentiles.mean, Some(100.0));
    assert_eq!(h01.projected_percentiles.variance, Some(50.0));

    let h06 = &data.contracts[5];
    assert_eq!(h06.current_mean_category, Some(MeanCategory::High));
    assert_eq!(h06.current_variance_category, Some(VarianceCategory::High));
    assert_eq!(h06.projected_mean_category, Some(MeanCategory::Below));
    assert_eq!(h06.current_rating_rounded, Some(3.5));
    assert_eq!(h06.final_projected_rounded, Some(3.0));
    assert_eq!(h06.star_bracket_change, Some(-1));
    assert_eq!(h06.current_percentiles.mean, Some(100.0));
    assert_eq!(h06.projected_percentiles.mean, Some(50.0));
    assert_eq!(h06.projected_percentiles.variance, Some(100.0));

    let summary = &data.summary;
    assert_eq!(summary.total_contracts, 10);
    assert_eq!(summary.contracts_gaining_r_factor, 5);
    assert_eq!(summary.contracts_losing_r_factor, 0);
    assert_eq!(summary.contracts_unchanged, 5);
    assert!(approx(summary.avg_r_factor_change, 0.2));
    assert_eq!(summary.change_distribution.get("gained +0.4"), Some(&5));
    assert_eq!(summary.change_distribution.get("unchanged"), Some(&5));
    let gainers: Vec<&str> = summary
        .top_gainers
        .iter()
        .map(|m| m.contract_id.as_str())
        .collect();
    assert_eq!(gainers, vec!["H01", "H02", "H03", "H04", "H05"]);
    assert!(summary.top_losers.is_empty());
}

#[tokio::test]
async fn test_reward_factor_without_exclusions_is_stable() {
    let repo = support::reward_factor_repository();
    let data = services::get_reward_factor_data(&repo, 2025, vec![], &EngineConfig::default())
        .await
        .unwrap();

    assert_eq!(data.current_thresholds, data.projected_thresholds);
    assert_eq!(data.summary.contracts_unchanged, 10);
    assert_eq!(data.summary.change_distribution.len(), 1);
}

#[tokio::test]
async fn test_reward_factor_top_movers_limit() {
    let repo = support::reward_factor_repository();
    let config = EngineConfig {
        top_movers: 2,
        ..EngineConfig::default()
    };
    let data = services::get_reward_factor_data(&repo, 2025, vec![MeasureCode::from("X")], &config)
        .await
        .unwrap();
    assert_eq!(data.summary.contracts_gaining_r_factor, 5);
    assert_eq!(data.summary.top_gainers.len(), 2);
    assert_eq!(data.summary.top_gainers[1].contract_id.as_str(), "H02");
}

#[tokio::test]
async fn test_reward_factor_exclusions_normalized() {
    let repo = support::reward_factor_repository();
    let data = services::get_reward_factor_data(
        &repo,
        2025,
        vec![MeasureCode::from(" X "), MeasureCode::from("X"), MeasureCode::from("")],
        &EngineConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(data.excluded_measures, vec![MeasureCode::from("X")]);
}

#[tokio::test]
async fn test_reward_factor_exclusion_ignores_case() {
    let repo = support::reward_factor_repository();
    let data = services::get_reward_factor_data(
        &repo,
        2025,
        vec![MeasureCode::from("x")],
        &EngineConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(data.excluded_measures, vec![MeasureCode::from("X")]);
    assert_eq!(data.summary.contracts_gaining_r_factor, 5);
    assert_eq!(data.summary.contracts_losing_r_factor, 0);
}

#[tokio::test]
async fn test_reward_factor_is_deterministic() {
    let repo = support::reward_factor_repository();
    let config = EngineConfig::default();
    let excluded = vec![MeasureCode::from("X")];

    let first = services::get_reward_factor_data(&repo, 2025, excluded.clone(), &config)
        .await
        .unwrap();
    let second = services::get_reward_factor_data(&repo, 2025, excluded, &config)
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_reward_factor_threshold_comparison() {
    let repo = support::sample_repository();
    let data = services::get_reward_factor_data(&repo, 2025, vec![], &EngineConfig::default())
        .await
        .unwrap();

    assert_eq!(data.contracts.len(), 4);
    let official = data.official_thresholds.unwrap();
    assert_eq!(official.mean_65th, 3.5);
    let comparison = data.threshold_comparison.unwrap();
    assert_eq!(comparison.mean_65th.official, 3.5);
    let expected = data.current_thresholds.unwrap().mean_65th - 3.5;
    assert!((comparison.mean_65th.difference - expected).abs() < 1e-4);
}

// =========================================================
// Distributions and trends
// =========================================================

#[tokio::test]
async fn test_distribution_focus_vs_market() {
    let repo = support::sample_repository();
    let data = services::get_distribution_data(&repo, 2025, "acme health".to_string())
        .await
        .unwrap();

    assert_eq!(data.focus.contract_count, 2);
    assert_eq!(data.focus.total_enrollment, 1500);
    assert_eq!(data.market.name, "Rest of market");
    assert_eq!(data.market.contract_count, 2);
    assert_eq!(data.market.total_enrollment, 200);

    let c01 = &data.measures[0];
    assert_eq!(c01.measure_code.as_str(), "C01");
    assert_eq!(c01.focus.distribution.counts, [0, 0, 0, 1, 1]);
    assert_eq!(c01.focus.percentages.high_star_percentage, 100.0);
    assert_eq!(c01.market.distribution.counts, [0, 0, 1, 1, 0]);
    assert_eq!(c01.market.percentages.high_star_percentage, 50.0);
    assert_eq!(c01.focus.median_score, Some(76.5));
    assert_eq!(c01.focus.score_quartiles.q1, Some(71.0));
    assert_eq!(c01.focus.score_quartiles.q3, Some(82.0));

    let d01 = &data.measures[1];
    assert_eq!(d01.market.distribution.total, 1);
    assert_eq!(d01.market.percentages.high_star_percentage, 0.0);
}

#[tokio::test]
async fn test_high_star_trends_default_years() {
    let repo = support::sample_repository();
    let trends = services::get_high_star_trends(&repo, "Acme Health".to_string(), None, None)
        .await
        .unwrap();

    assert_eq!((trends.from_year, trends.to_year), (2024, 2025));
    assert_eq!(trends.measures.len(), 2);

    let c01 = &trends.measures[0];
    assert_eq!(c01.focus_from_percentage, 50.0);
    assert_eq!(c01.focus_change, 50.0);
    assert_eq!(c01.market_change, 0.0);
    assert_eq!(c01.improved_more, ImprovementLeader::Focus);
    assert_eq!(trends.measures[1].improved_more, ImprovementLeader::Tie);

    assert_eq!(trends.focus_improved_more, 1);
    assert_eq!(trends.market_improved_more, 0);
    assert_eq!(trends.ties, 1);
}

#[tokio::test]
async fn test_high_star_trends_rejects_reversed_years() {
    let repo = support::sample_repository();
    let err = services::get_high_star_trends(
        &repo,
        "Acme Health".to_string(),
        Some(2025),
        Some(2024),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_high_star_trends_unknown_year_not_found() {
    let repo = support::sample_repository();
    let err = services::get_high_star_trends(
        &repo,
        "Acme Health".to_string(),
        Some(2010),
        Some(2011),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}
