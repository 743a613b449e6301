//! # Meridian Core Types
//!
//! Layer 0 of the workspace: the vocabulary every other crate speaks. It holds
//! the validated `ReturnSeries`, the `StrategyId` used as the ranking
//! tie-break, and the small enums shared between configuration and analysis.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Direction, StandardizationMethod, WeightingScheme};
pub use error::CoreError;
pub use structs::{
    AlignedReturns, BenchmarkSeries, DateRange, ReturnPoint, ReturnSeries, StrategyId,
};
