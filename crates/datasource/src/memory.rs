use crate::{DataError, DataSource};
use core_types::{DateRange, ReturnSeries, StrategyId};
use std::collections::BTreeMap;

/// A `DataSource` backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    series: BTreeMap<StrategyId, ReturnSeries>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the series stored under `id`.
    pub fn insert(&mut self, id: impl Into<StrategyId>, series: ReturnSeries) -> &mut Self {
        self.series.insert(id.into(), series);
        self
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl From<BTreeMap<StrategyId, ReturnSeries>> for InMemorySource {
    fn from(series: BTreeMap<StrategyId, ReturnSeries>) -> Self {
        Self { series }
    }
}

impl DataSource for InMemorySource {
    fn strategy_ids(&self) -> Vec<StrategyId> {
        self.series.keys().cloned().collect()
    }

    fn fetch(&self, id: &StrategyId, range: &DateRange) -> Result<ReturnSeries, DataError> {
        self.series
            .get(id)
            .map(|series| series.slice(range))
            .ok_or_else(|| DataError::StrategyNotFound(id.clone()))
    }
}
