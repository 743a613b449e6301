//! # Meridian Data Source
//!
//! Supplies the return series the ranking pipeline evaluates.
//!
//! ## Architectural Principles
//!
//! - **Adapter Layer:** Storage details stay behind the `DataSource` trait. The pipeline
//!   only ever sees validated `ReturnSeries` values.
//! - **Validate at the Boundary:** Every series is checked when it is loaded, so the
//!   analytics crates never have to guard against unordered or non-finite returns.
//!
//! ## Public API
//!
//! - `DataSource`: The contract for looking up a strategy's returns over a date range.
//! - `InMemorySource`: A map-backed source, used by tests and embedders.
//! - `JsonFileSource`: Loads every series from a single JSON document.
//! - `DataError`: The specific error types that can be returned from this crate.

use core_types::{DateRange, ReturnSeries, StrategyId};

// Declare the modules that constitute this crate.
pub mod error;
pub mod json_file;
pub mod memory;

// Re-export the key components to create a clean, public-facing API.
pub use error::DataError;
pub use json_file::JsonFileSource;
pub use memory::InMemorySource;

/// The contract the pipeline uses to obtain return series, allowing the
/// underlying storage to be swapped out.
pub trait DataSource: Send + Sync {
    /// Every identifier this source can serve, in ascending order.
    fn strategy_ids(&self) -> Vec<StrategyId>;

    /// The observations of `id` that fall inside `range`.
    fn fetch(&self, id: &StrategyId, range: &DateRange) -> Result<ReturnSeries, DataError>;
}
