//! Repository trait definitions for ratings data access.
//!
//! This module provides a collection of focused repository traits that abstract
//! where contracts, measures and metric rows come from. The analytics services
//! only ever receive the typed records these traits return.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`ratings`]: Measure-level metrics, measure metadata, overall ratings, thresholds
//! - [`contracts`]: Contracts, plan enrollment and dataset-level queries
//!
//! # Convenience Trait Bound
//!
//! For functions that need all repository capabilities, use the [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R, year: i32) -> RepositoryResult<()> {
//!     let metrics = repo.fetch_metric_observations(year).await?;
//!     let contracts = repo.fetch_contracts(year).await?;
//!     Ok(())
//! }
//! ```

pub mod contracts;
pub mod error;
pub mod ratings;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use contracts::ContractRepository;
pub use ratings::RatingsRepository;

/// Composite trait bound for a complete repository implementation.
///
/// This trait is automatically implemented for any type that implements
/// both repository traits.
pub trait FullRepository: RatingsRepository + ContractRepository {}

// Blanket implementation: any type implementing both traits automatically implements FullRepository
impl<T> FullRepository for T where T: RatingsRepository + ContractRepository {}
