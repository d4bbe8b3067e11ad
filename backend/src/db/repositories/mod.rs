//! Repository implementations module.
//!
//! - `local`: In-memory implementation for unit testing, local development and
//!   serving a JSON dataset file
pub mod local;

pub use local::LocalRepository;
