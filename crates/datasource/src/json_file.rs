use crate::{DataError, DataSource, InMemorySource};
use core_types::{DateRange, ReturnPoint, ReturnSeries, StrategyId};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// The on-disk layout:
///
/// ```json
/// { "series": { "fund-a": [ { "timestamp": "2023-01-01T00:00:00Z", "return": 0.012 } ] } }
/// ```
#[derive(Debug, Deserialize)]
struct ReturnsDocument {
    series: BTreeMap<String, Vec<ReturnPoint>>,
}

/// A `DataSource` that reads every series from one JSON document up front.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    inner: InMemorySource,
}

impl JsonFileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let source = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            series = source.inner.len(),
            "Loaded return series."
        );
        Ok(source)
    }

    /// Parses a document and validates every series in it.
    pub fn from_json(contents: &str) -> Result<Self, DataError> {
        let document: ReturnsDocument = serde_json::from_str(contents)?;

        let mut inner = InMemorySource::new();
        for (id, points) in document.series {
            let id = StrategyId::from(id);
            let series = ReturnSeries::new(points).map_err(|source| DataError::InvalidSeries {
                id: id.clone(),
                source,
            })?;
            inner.insert(id, series);
        }

        Ok(Self { inner })
    }
}

impl DataSource for JsonFileSource {
    fn strategy_ids(&self) -> Vec<StrategyId> {
        self.inner.strategy_ids()
    }

    fn fetch(&self, id: &StrategyId, range: &DateRange) -> Result<ReturnSeries, DataError> {
        self.inner.fetch(id, range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOCUMENT: &str = r#"{
        "series": {
            "fund-b": [
                { "timestamp": "2023-01-31T00:00:00Z", "return": 0.01 },
                { "timestamp": "2023-02-28T00:00:00Z", "return": -0.02 }
            ],
            "fund-a": [
                { "timestamp": "2023-01-31T00:00:00Z", "return": 0.03 }
            ]
        }
    }"#;

    #[test]
    fn test_open_reads_every_series() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let source = JsonFileSource::open(file.path()).unwrap();

        assert_eq!(source.strategy_ids(), vec![StrategyId::from("fund-a"), StrategyId::from("fund-b")]);
        let b = source.fetch(&"fund-b".into(), &DateRange::unbounded()).unwrap();
        assert_eq!(b.values(), vec![0.01, -0.02]);
    }

    #[test]
    fn test_unordered_series_is_rejected_with_its_id() {
        let document = r#"{
            "series": {
                "bad": [
                    { "timestamp": "2023-02-28T00:00:00Z", "return": 0.01 },
                    { "timestamp": "2023-01-31T00:00:00Z", "return": 0.02 }
                ]
            }
        }"#;

        let err = JsonFileSource::from_json(document).unwrap_err();
        assert!(matches!(err, DataError::InvalidSeries { ref id, .. } if id.as_str() == "bad"));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = JsonFileSource::open("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(
            JsonFileSource::from_json("{ \"series\": 3 }"),
            Err(DataError::JsonError(_))
        ));
    }
}
