//! Core data models for the stats service.

mod ids;
mod match_record;
mod stats;

pub use ids::*;
pub use match_record::*;
pub use stats::*;
