use crate::error::AnalyticsError;
use core_types::StrategyId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a single (strategy, metric) cell holds no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnavailableReason {
    /// Fewer observations than the metric needs.
    InsufficientData,
    /// The metric is benchmark-relative and no benchmark was supplied.
    MissingBenchmark,
    /// The inputs make the formula undefined, e.g. a zero-variance denominator.
    DegenerateInput,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnavailableReason::InsufficientData => "insufficient data",
            UnavailableReason::MissingBenchmark => "missing benchmark",
            UnavailableReason::DegenerateInput => "degenerate input",
        };
        f.write_str(text)
    }
}

/// One cell of a metric table. Never silently omitted: a cell that could not be
/// computed carries the reason instead of a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MetricValue {
    Value(f64),
    Unavailable(UnavailableReason),
}

impl MetricValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(*v),
            MetricValue::Unavailable(_) => None,
        }
    }

    pub fn reason(&self) -> Option<UnavailableReason> {
        match self {
            MetricValue::Value(_) => None,
            MetricValue::Unavailable(reason) => Some(*reason),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, MetricValue::Value(_))
    }
}

impl From<Result<f64, UnavailableReason>> for MetricValue {
    fn from(result: Result<f64, UnavailableReason>) -> Self {
        match result {
            Ok(v) if v.is_finite() => MetricValue::Value(v),
            Ok(_) => MetricValue::Unavailable(UnavailableReason::DegenerateInput),
            Err(reason) => MetricValue::Unavailable(reason),
        }
    }
}

/// A dense strategy × metric grid.
///
/// Rows are strategies, columns are metrics, and every row has exactly one
/// cell per column. The same shape carries raw values out of the engine and
/// standardized values out of the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    strategies: Vec<StrategyId>,
    metrics: Vec<String>,
    cells: Vec<MetricValue>,
}

/// Output of the metric engine.
pub type RawMetricTable = MetricTable;

impl MetricTable {
    /// Builds a table from row-major cells.
    pub fn from_rows(
        strategies: Vec<StrategyId>,
        metrics: Vec<String>,
        cells: Vec<MetricValue>,
    ) -> Result<Self, AnalyticsError> {
        let expected = strategies.len() * metrics.len();
        if cells.len() != expected {
            return Err(AnalyticsError::ShapeMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            strategies,
            metrics,
            cells,
        })
    }

    /// Builds a table from one vector per metric column.
    pub fn from_columns(
        strategies: Vec<StrategyId>,
        metrics: Vec<String>,
        columns: Vec<Vec<MetricValue>>,
    ) -> Result<Self, AnalyticsError> {
        let expected = strategies.len() * metrics.len();
        let actual: usize = columns.iter().map(Vec::len).sum();
        if columns.len() != metrics.len()
            || columns.iter().any(|c| c.len() != strategies.len())
        {
            return Err(AnalyticsError::ShapeMismatch { expected, actual });
        }

        let mut cells = Vec::with_capacity(expected);
        for row in 0..strategies.len() {
            cells.extend(columns.iter().map(|column| column[row]));
        }
        Self::from_rows(strategies, metrics, cells)
    }

    pub fn strategies(&self) -> &[StrategyId] {
        &self.strategies
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn num_strategies(&self) -> usize {
        self.strategies.len()
    }

    pub fn num_metrics(&self) -> usize {
        self.metrics.len()
    }

    pub fn strategy_index(&self, strategy: &StrategyId) -> Option<usize> {
        self.strategies.iter().position(|s| s == strategy)
    }

    pub fn metric_index(&self, metric: &str) -> Option<usize> {
        self.metrics.iter().position(|m| m == metric)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&MetricValue> {
        if column >= self.metrics.len() {
            return None;
        }
        self.cells.get(row * self.metrics.len() + column)
    }

    pub fn get(&self, strategy: &StrategyId, metric: &str) -> Option<&MetricValue> {
        self.cell(self.strategy_index(strategy)?, self.metric_index(metric)?)
    }

    /// All cells of one strategy, in metric order.
    pub fn row(&self, row: usize) -> &[MetricValue] {
        let width = self.metrics.len();
        &self.cells[row * width..(row + 1) * width]
    }

    /// All cells of one metric, in strategy order.
    pub fn column(&self, column: usize) -> Vec<MetricValue> {
        self.cells
            .iter()
            .skip(column)
            .step_by(self.metrics.len().max(1))
            .copied()
            .take(self.strategies.len())
            .collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&StrategyId, &[MetricValue])> {
        self.strategies
            .iter()
            .enumerate()
            .map(|(i, strategy)| (strategy, self.row(i)))
    }

    pub fn available_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_available()).count()
    }

    pub fn cells(&self) -> &[MetricValue] {
        &self.cells
    }
}
