//! # MA Stars
//!
//! Projection and threshold analytics for Medicare Advantage Star Ratings.
//!
//! The crate loads per-contract, per-measure star observations for one or
//! more rating years and derives the analytics a plan analyst needs to reason
//! about next year's rating:
//!
//! - **Cut points**: lower score bound of each star level per measure
//! - **Risk / opportunity**: contracts close to losing or gaining a star
//! - **Reward Factor**: weighted mean/variance thresholds, the per-contract
//!   bonus, and a projection with selected measures removed
//! - **Distributions**: star histograms of an organization against the rest
//!   of the market, and their year-over-year high-star trend
//!
//! ## Architecture
//!
//! - [`api`]: Identifiers and response types
//! - [`config`]: Engine tunables (proximity, categories, Reward Factor table)
//! - [`models`]: Observation, measure, and contract records
//! - [`db`]: Repository traits, the in-memory backend, and snapshot loading
//! - [`services`]: The analytics engines
//! - [`http`]: Axum-based REST API
//! - [`routes`]: Route-specific response types

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;

pub mod db;
pub mod models;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
