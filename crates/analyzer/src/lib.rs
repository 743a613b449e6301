//! # Meridian Analyzer
//!
//! This crate turns a raw metric table into a ranking. It is the "decision maker":
//! every strategy's metrics are brought onto a common scale, collapsed into one
//! composite score and ordered.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** Builds on `analytics` (the metric engine) and `core-types`. It reads
//!   return data only through the `datasource::DataSource` trait.
//! - **Fail Fast on Configuration:** Unknown or duplicate metrics, invalid weights and an
//!   invalid tie epsilon are rejected by `PipelineConfig::validate` before any metric is
//!   computed.
//! - **Deterministic Output:** Columns are standardized independently and ties are broken by
//!   strategy identifier, so identical inputs always yield identical rankings.
//!
//! ## Public API
//!
//! - `RankingPipeline`: Runs engine → standardizer → weighting → scorer → ranker.
//! - `Standardizer`: Z-score, min-max and rank-percentile column transforms.
//! - `Scorer`: Weighted, direction-aware composite scores with re-normalization.
//! - `Ranker`: The total, reproducible ordering of scored strategies.
//! - `rollup`: Mean-score ranking of strategy groups.
//! - `AnalyzerError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod pipeline;
pub mod ranker;
pub mod rollup;
pub mod scorer;
pub mod standardizer;
pub mod weighting;

// Re-export the key components to create a clean, public-facing API.
pub use error::AnalyzerError;
pub use pipeline::{PipelineConfig, PipelineOutput, RankingPipeline};
pub use ranker::{RankedEntry, RankedResult, Ranker};
pub use rollup::{GroupRanking, GroupScore, StrategyGroup, rollup};
pub use scorer::{Contribution, ExcludedMetric, Exclusion, ExclusionReason, ScoreCard, ScoreEntry, Scorer};
pub use standardizer::{StandardizedMetricTable, Standardizer};
pub use weighting::resolve_weights;
