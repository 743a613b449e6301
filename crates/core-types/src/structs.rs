use crate::error::CoreError;
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifies a single strategy under evaluation.
///
/// Identifiers are compared lexicographically; this ordering is the tie-break
/// used throughout ranking.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyId(String);

impl StrategyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StrategyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StrategyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single period return, e.g. 0.012 for +1.2%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "return")]
    pub value: f64,
}

impl ReturnPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// An inclusive window of time used to select observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range that contains every representable timestamp.
    pub fn unbounded() -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Strategy and benchmark returns paired on common timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedReturns {
    pub returns: Vec<f64>,
    pub benchmark: Vec<f64>,
}

impl AlignedReturns {
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Period-by-period active returns (strategy minus benchmark).
    pub fn active(&self) -> Vec<f64> {
        self.returns
            .iter()
            .zip(&self.benchmark)
            .map(|(r, b)| r - b)
            .collect()
    }
}

/// A validated, time-ordered series of period returns.
///
/// Timestamps are strictly increasing, every value is finite and no single
/// period loses more than 100%. The series cannot be modified after
/// construction; the windowing helpers return new series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ReturnPoint>", into = "Vec<ReturnPoint>")]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

/// A reference index. Same shape and guarantees as a strategy series.
pub type BenchmarkSeries = ReturnSeries;

impl ReturnSeries {
    pub fn new(points: Vec<ReturnPoint>) -> Result<Self, CoreError> {
        for point in &points {
            if !point.value.is_finite() {
                return Err(CoreError::NonFiniteReturn {
                    timestamp: point.timestamp,
                });
            }
            if point.value < -1.0 {
                return Err(CoreError::ReturnBelowTotalLoss {
                    timestamp: point.timestamp,
                    value: point.value,
                });
            }
        }

        for pair in points.windows(2) {
            match pair[0].timestamp.cmp(&pair[1].timestamp) {
                Ordering::Less => {}
                Ordering::Equal => return Err(CoreError::DuplicateTimestamp(pair[1].timestamp)),
                Ordering::Greater => {
                    return Err(CoreError::UnorderedTimestamps {
                        previous: pair[0].timestamp,
                        current: pair[1].timestamp,
                    });
                }
            }
        }

        Ok(Self { points })
    }

    /// Builds a monthly series whose first observation falls on `start`.
    pub fn from_monthly(start: NaiveDate, values: &[f64]) -> Result<Self, CoreError> {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let date = u32::try_from(i)
                    .ok()
                    .and_then(|offset| start.checked_add_months(Months::new(offset)))
                    .ok_or_else(|| {
                        CoreError::InvalidInput(
                            "from_monthly".to_string(),
                            format!("month offset {} overflows the calendar", i),
                        )
                    })?;
                Ok(ReturnPoint::new(date.and_time(chrono::NaiveTime::MIN).and_utc(), value))
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The raw return values in time order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// The trailing `n` observations (or the whole series if it is shorter).
    pub fn tail(&self, n: usize) -> Self {
        let start = self.points.len().saturating_sub(n);
        Self {
            points: self.points[start..].to_vec(),
        }
    }

    /// Observations whose timestamp falls inside `range` (inclusive).
    pub fn slice(&self, range: &DateRange) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| range.contains(p.timestamp))
                .copied()
                .collect(),
        }
    }

    /// Inner-joins this series with `benchmark` on timestamp.
    pub fn align_with(&self, benchmark: &BenchmarkSeries) -> AlignedReturns {
        let mut aligned = AlignedReturns::default();
        let (mut i, mut j) = (0, 0);

        // Both sides are strictly ordered, so a single merge pass suffices.
        while i < self.points.len() && j < benchmark.points.len() {
            let (ours, theirs) = (&self.points[i], &benchmark.points[j]);
            match ours.timestamp.cmp(&theirs.timestamp) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    aligned.returns.push(ours.value);
                    aligned.benchmark.push(theirs.value);
                    i += 1;
                    j += 1;
                }
            }
        }

        aligned
    }
}

impl TryFrom<Vec<ReturnPoint>> for ReturnSeries {
    type Error = CoreError;

    fn try_from(points: Vec<ReturnPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<ReturnSeries> for Vec<ReturnPoint> {
    fn from(series: ReturnSeries) -> Self {
        series.points
    }
}
