//! High-level database service layer.
//!
//! This module provides repository-agnostic operations that work with any
//! implementation of the repository traits. The analytics engine never talks
//! to a repository directly: it receives a [`YearSnapshot`] assembled here,
//! fetched in full before any analysis starts.
//!
//! # Usage
//!
//! ```no_run
//! use ma_stars::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::from_json_file("data/stars.json")?;
//!
//!     let snapshot = services::load_year_snapshot(&repo, 2025).await?;
//!     println!("{} observations", snapshot.observations.len());
//!
//!     Ok(())
//! }
//! ```

use log::{debug, info, warn};
use std::collections::HashSet;

use super::models::{ContractId, MeasureCatalog, YearSnapshot};
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::api::{DatasetInfo, OrganizationInfo};

// ==================== Health & Connection ====================

/// Check if the data source is healthy.
///
/// This is a simple pass-through to the repository's health check.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Dataset Operations ====================

/// Years that have measure-level data, ascending.
pub async fn list_years<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<i32>> {
    repo.list_years().await
}

/// Fail with `NotFound` when the dataset has no metric rows for `year`.
pub async fn ensure_year_available<R: FullRepository + ?Sized>(
    repo: &R,
    year: i32,
) -> RepositoryResult<()> {
    if repo.list_years().await?.contains(&year) {
        Ok(())
    } else {
        Err(RepositoryError::year_not_found(year, "ensure_year_available"))
    }
}

pub async fn dataset_info<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<DatasetInfo> {
    repo.dataset_info().await
}

/// Fetch everything the analytics engine needs for one year.
///
/// Metric rows for contracts outside the contract list are kept: the rated
/// allow-list, not the contract list, decides who takes part in analysis.
pub async fn load_year_snapshot<R: FullRepository + ?Sized>(
    repo: &R,
    year: i32,
) -> RepositoryResult<YearSnapshot> {
    let observations = repo.fetch_metric_observations(year).await?;
    let measures = repo.fetch_measure_meta().await?;
    let contracts = repo.fetch_contracts(year).await?;
    let enrollment = repo.fetch_plan_enrollment(year).await?;
    let overall_ratings = repo.fetch_overall_ratings(year).await?;
    let official_thresholds = repo.fetch_official_thresholds(year).await?;

    let unusable = observations.iter().filter(|o| !o.is_usable()).count();
    if unusable > 0 {
        warn!(
            "Year {}: {} of {} metric rows carry neither a valid star nor a finite rate",
            year,
            unusable,
            observations.len()
        );
    }

    let catalog = MeasureCatalog::from_entries(measures);
    let snapshot = YearSnapshot {
        year,
        observations,
        catalog,
        contracts,
        enrollment,
        overall_ratings,
        official_thresholds,
    };

    info!(
        "Loaded snapshot for {}: {} metric rows, {} measures, {} contracts, {} rated",
        year,
        snapshot.observations.len(),
        snapshot.catalog.len(),
        snapshot.contracts.len(),
        snapshot.rated_contract_ids().len()
    );

    Ok(snapshot)
}

/// Contracts holding an official overall rating for `year`.
pub async fn rated_contract_ids<R: FullRepository + ?Sized>(
    repo: &R,
    year: i32,
) -> RepositoryResult<HashSet<ContractId>> {
    let ratings = repo.fetch_overall_ratings(year).await?;
    let rated: HashSet<ContractId> = ratings
        .into_iter()
        .filter(|r| r.is_rated())
        .map(|r| r.contract_id)
        .collect();
    debug!("Year {}: {} rated contracts", year, rated.len());
    Ok(rated)
}

/// Parent organizations present in `year`, with their contract counts.
pub async fn list_organizations<R: FullRepository + ?Sized>(
    repo: &R,
    year: i32,
) -> RepositoryResult<Vec<OrganizationInfo>> {
    let contracts = repo.fetch_contracts(year).await?;

    let mut by_org: std::collections::BTreeMap<String, HashSet<ContractId>> =
        std::collections::BTreeMap::new();
    for contract in contracts {
        let Some(org) = contract.parent_organization.as_deref().map(str::trim) else {
            continue;
        };
        if org.is_empty() {
            continue;
        }
        by_org
            .entry(org.to_string())
            .or_default()
            .insert(contract.contract_id.clone());
    }

    Ok(by_org
        .into_iter()
        .map(|(name, ids)| OrganizationInfo {
            name,
            contract_count: ids.len(),
        })
        .collect())
}
