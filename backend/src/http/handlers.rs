//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{
    required_organization, CutPointData, DatasetInfo, DistributionData, DistributionQuery,
    HealthResponse, HighStarTrendData, OrganizationListResponse, RewardFactorData,
    RewardFactorQuery, RiskOpportunityData, RiskQuery, TrendsQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Fail with 404 when the dataset has no metric rows for `year`.
async fn ensure_year(state: &AppState, year: i32) -> Result<(), AppError> {
    db_services::ensure_year_available(state.repository.as_ref(), year).await?;
    Ok(())
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the data source is available.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Dataset
// =============================================================================

/// GET /v1/dataset
pub async fn get_dataset_info(State(state): State<AppState>) -> HandlerResult<DatasetInfo> {
    let info = db_services::dataset_info(state.repository.as_ref()).await?;
    Ok(Json(info))
}

/// GET /v1/years/{year}/organizations
pub async fn list_organizations(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> HandlerResult<OrganizationListResponse> {
    let organizations = db_services::list_organizations(state.repository.as_ref(), year).await?;
    let total = organizations.len();

    Ok(Json(OrganizationListResponse {
        year,
        organizations,
        total,
    }))
}

// =============================================================================
// Analytics Endpoints
// =============================================================================

/// GET /v1/years/{year}/cut-points
pub async fn get_cut_points(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> HandlerResult<CutPointData> {
    ensure_year(&state, year).await?;
    let data = services::get_cut_point_data(state.repository.as_ref(), year).await?;
    Ok(Json(data))
}

/// GET /v1/years/{year}/risk-opportunity?organization=
pub async fn get_risk_opportunity(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<RiskQuery>,
) -> HandlerResult<RiskOpportunityData> {
    ensure_year(&state, year).await?;
    let organization = required_organization(query.organization.as_deref());
    let data = services::get_risk_opportunity_data(
        state.repository.as_ref(),
        year,
        organization,
        &state.config,
    )
    .await?;
    Ok(Json(data))
}

/// GET /v1/years/{year}/reward-factor?exclude=C01,D02&top=
pub async fn get_reward_factor(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<RewardFactorQuery>,
) -> HandlerResult<RewardFactorData> {
    ensure_year(&state, year).await?;

    let mut config = (*state.config).clone();
    if let Some(top) = query.top {
        config.top_movers = top;
    }

    let data = services::get_reward_factor_data(
        state.repository.as_ref(),
        year,
        query.excluded_measures(),
        &config,
    )
    .await?;
    Ok(Json(data))
}

/// GET /v1/years/{year}/distributions?organization=
pub async fn get_distributions(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<DistributionQuery>,
) -> HandlerResult<DistributionData> {
    let organization = required_organization(query.organization.as_deref())
        .ok_or_else(|| AppError::BadRequest("organization query parameter is required".into()))?;
    ensure_year(&state, year).await?;

    let data =
        services::get_distribution_data(state.repository.as_ref(), year, organization).await?;
    Ok(Json(data))
}

/// GET /v1/trends/high-star?organization=&from=&to=
pub async fn get_high_star_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendsQuery>,
) -> HandlerResult<HighStarTrendData> {
    let organization = required_organization(query.organization.as_deref())
        .ok_or_else(|| AppError::BadRequest("organization query parameter is required".into()))?;

    let data = services::get_high_star_trends(
        state.repository.as_ref(),
        organization,
        query.from,
        query.to,
    )
    .await?;
    Ok(Json(data))
}
