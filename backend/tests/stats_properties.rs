//! Property-based tests for the statistics primitives and rating arithmetic.

use proptest::prelude::*;

use ma_stars::api::StarDistribution;
use ma_stars::models::StarBucket;
use ma_stars::services::calculate_percentages;
use ma_stars::services::reward_factor::round_half_star;
use ma_stars::services::stats::{
    median, percentile_rank, percentile_value, quartiles, sorted_finite, weighted_stats,
};

proptest! {
    #[test]
    fn prop_percentile_rank_monotone(
        values in prop::collection::vec(0.0..100.0f64, 1..40),
        x in 0.0..100.0f64,
        y in 0.0..100.0f64,
    ) {
        let sorted = sorted_finite(values);
        let (low, high) = if x <= y { (x, y) } else { (y, x) };
        let r_low = percentile_rank(&sorted, Some(low)).unwrap();
        let r_high = percentile_rank(&sorted, Some(high)).unwrap();
        prop_assert!(r_low <= r_high);
        prop_assert!((0.0..=100.0).contains(&r_high));
    }

    #[test]
    fn prop_quartiles_bracket_median(values in prop::collection::vec(-50.0..50.0f64, 2..40)) {
        let sorted = sorted_finite(values);
        let q = quartiles(&sorted);
        let m = median(&sorted).unwrap();
        let (q1, q3) = (q.q1.unwrap(), q.q3.unwrap());
        prop_assert!(q1 <= m + 1e-9);
        prop_assert!(m <= q3 + 1e-9);
    }

    #[test]
    fn prop_percentile_within_sample_bounds(
        values in prop::collection::vec(-1e3..1e3f64, 1..40),
        p in 0.0..=100.0f64,
    ) {
        let sorted = sorted_finite(values);
        let value = percentile_value(&sorted, p).unwrap();
        prop_assert!(value >= sorted[0] - 1e-9);
        prop_assert!(value <= sorted[sorted.len() - 1] + 1e-9);
    }

    #[test]
    fn prop_percentile_monotone_in_p(
        values in prop::collection::vec(0.0..5.0f64, 1..40),
        a in 0.0..=100.0f64,
        b in 0.0..=100.0f64,
    ) {
        let sorted = sorted_finite(values);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let v_low = percentile_value(&sorted, low).unwrap();
        let v_high = percentile_value(&sorted, high).unwrap();
        prop_assert!(v_low <= v_high + 1e-9);
    }

    #[test]
    fn prop_weighted_stats_bounds(
        pairs in prop::collection::vec((1.0..=5.0f64, 0.5..5.0f64), 1..20),
    ) {
        let input: Vec<(Option<f64>, f64)> = pairs.iter().map(|(v, w)| (Some(*v), *w)).collect();
        let stats = weighted_stats(&input).unwrap();
        let min = pairs.iter().map(|(v, _)| *v).fold(f64::INFINITY, f64::min);
        let max = pairs.iter().map(|(v, _)| *v).fold(f64::NEG_INFINITY, f64::max);

        prop_assert!(stats.mean >= min - 1e-9 && stats.mean <= max + 1e-9);
        prop_assert!(stats.variance >= -1e-9);
        prop_assert_eq!(stats.count, pairs.len());
    }

    #[test]
    fn prop_percentages_sum_to_hundred(counts in prop::collection::vec(0u8..5, 1..60)) {
        let mut distribution = StarDistribution::default();
        for c in &counts {
            distribution.add(StarBucket::new(c + 1).unwrap());
        }
        let pct = calculate_percentages(&distribution);
        let sum: f64 = pct.percentages.iter().sum();
        prop_assert!((sum - 100.0).abs() < 0.05);
        prop_assert!(pct.high_star_percentage >= 0.0 && pct.high_star_percentage <= 100.0);
    }

    #[test]
    fn prop_round_half_star_grid(rating in 0.0..6.0f64) {
        let rounded = round_half_star(rating.min(5.0));
        prop_assert_eq!((rounded * 2.0).fract(), 0.0);
        prop_assert!((rounded - rating.min(5.0)).abs() <= 0.25 + 1e-9);
        prop_assert!(rounded <= 5.0);
    }
}

#[test]
fn test_weighted_stats_without_weight() {
    assert!(weighted_stats(&[(Some(4.0), 0.0), (None, 2.0)]).is_none());
}
