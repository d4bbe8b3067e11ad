//! Service layer for the star rating analytics engine.
//!
//! Every module exposes pure `compute_*` functions over an in-memory
//! [`YearSnapshot`](crate::db::YearSnapshot) plus an async `get_*` wrapper that
//! fetches the snapshot from a repository and runs the computation on the
//! blocking pool.

pub mod compare;
pub mod cut_points;
pub mod reward_factor;
pub mod risk;
pub mod stats;
pub mod trends;

pub use compare::{calculate_percentages, compute_distribution_data, get_distribution_data};
pub use cut_points::{compute_cut_point_data, derive_cut_points, get_cut_point_data};
pub use reward_factor::{compute_reward_factor_data, get_reward_factor_data};
pub use risk::{classify_observation, compute_risk_opportunity_data, get_risk_opportunity_data};
pub use trends::{compute_high_star_trends, get_high_star_trends};
