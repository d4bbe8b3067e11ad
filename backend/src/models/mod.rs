//! Typed input records.
//!
//! Rows arrive from the repository already shaped into these structs; the
//! analytics services never see untyped data.

pub mod contract;
pub mod measure;
pub mod observation;

pub use contract::*;
pub use measure::*;
pub use observation::*;
