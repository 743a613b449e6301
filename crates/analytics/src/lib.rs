//! # Meridian Analytics Engine
//!
//! This crate computes performance metrics from strategy return series. It acts
//! as the "unbiased judge" of the system: every number the ranking is built on
//! comes out of here.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Open for Extension:** Metrics implement the `MetricCalculator` trait and are looked
//!   up by name in a `CalculatorRegistry`. New metrics never require engine changes.
//! - **Per-Cell Failure Isolation:** A metric that cannot be computed for one strategy is
//!   recorded as `Unavailable` with a reason. Only configuration mistakes (unknown or
//!   duplicate metrics) fail a whole computation.
//!
//! ## Public API
//!
//! - `MetricEngine`: Evaluates every requested metric for every strategy.
//! - `CalculatorRegistry`: The name → calculator mapping.
//! - `MetricCalculator`: The trait all metrics implement.
//! - `MetricTable` / `MetricValue`: The strategy × metric result grid.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod calculators;
pub mod engine;
pub mod error;
pub mod registry;
pub mod spec;
pub mod stats;
pub mod table;

// Re-export the key components to create a clean, public-facing API.
pub use calculators::MetricCalculator;
pub use engine::MetricEngine;
pub use error::AnalyticsError;
pub use registry::CalculatorRegistry;
pub use spec::{MetricParams, MetricSpec};
pub use table::{MetricTable, MetricValue, RawMetricTable, UnavailableReason};
