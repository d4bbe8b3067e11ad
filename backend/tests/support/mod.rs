#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use ma_stars::api::ContractId;
use ma_stars::db::repositories::LocalRepository;
use ma_stars::models::{MeasureMeta, MetricObservation, OverallRating, StarValue};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =========================================================
// Fixtures
// =========================================================

/// Path of the two-year sample dataset (2024, 2025).
pub fn sample_dataset_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/ratings_sample.json")
}

pub fn sample_repository() -> LocalRepository {
    LocalRepository::from_json_file(sample_dataset_path()).expect("sample dataset should load")
}

fn measure(code: &str, weight: f64) -> MeasureMeta {
    MeasureMeta {
        code: code.into(),
        name: format!("Measure {}", code),
        domain: None,
        weight: Some(weight),
        year: 2025,
    }
}

/// Ten rated contracts over measures A, B and X (all weight 1).
///
/// H01-H05 score A=4, B=4, X=1; H06-H10 score A=5, B=1, X=5. Nobody earns a
/// Reward Factor over all three measures; dropping X lifts H01-H05 into the
/// high-mean / low-variance cell (+0.4) and leaves H06-H10 at 0.
pub fn reward_factor_repository() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.add_measures(vec![measure("A", 1.0), measure("B", 1.0), measure("X", 1.0)]);

    let mut metrics = Vec::new();
    let mut ratings = Vec::new();
    for n in 1..=10 {
        let id = format!("H{:02}", n);
        let stars: [(&str, f64); 3] = if n <= 5 {
            [("A", 4.0), ("B", 4.0), ("X", 1.0)]
        } else {
            [("A", 5.0), ("B", 1.0), ("X", 5.0)]
        };
        for (code, star) in stars {
            metrics.push(MetricObservation::new(
                id.as_str(),
                code,
                Some(StarValue::Number(star)),
                Some(star * 20.0),
                2025,
            ));
        }
        ratings.push(OverallRating {
            contract_id: ContractId::from(id.as_str()),
            year: 2025,
            overall_rating: Some(StarValue::Number(3.5)),
        });
    }
    repo.add_metrics(metrics);
    repo.add_overall_ratings(ratings);
    repo
}
