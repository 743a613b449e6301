use crate::error::AnalyzerError;
use crate::scorer::ScoreEntry;
use core_types::StrategyId;
use serde::Serialize;

/// One row of the final ranking. Ranks start at 1 and are never shared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub strategy: StrategyId,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedResult {
    pub entries: Vec<RankedEntry>,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedEntry> {
        self.entries.iter()
    }

    /// Strategy identifiers from best to worst.
    pub fn order(&self) -> Vec<&StrategyId> {
        self.entries.iter().map(|e| &e.strategy).collect()
    }

    pub fn rank_of(&self, strategy: &StrategyId) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| &e.strategy == strategy)
            .map(|e| e.rank)
    }
}

/// Orders scored strategies into a total, reproducible ranking.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    epsilon: f64,
}

impl Ranker {
    /// `epsilon` is the largest score gap still treated as a tie.
    pub fn new(epsilon: f64) -> Result<Self, AnalyzerError> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(AnalyzerError::InvalidEpsilon(epsilon));
        }
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn rank(&self, entries: &[ScoreEntry]) -> RankedResult {
        let scored = entries
            .iter()
            .map(|entry| (entry.strategy.clone(), entry.score))
            .collect();

        let entries = order_by_score(scored, self.epsilon)
            .into_iter()
            .enumerate()
            .map(|(position, (strategy, score))| RankedEntry {
                rank: position + 1,
                strategy,
                score,
            })
            .collect();

        RankedResult { entries }
    }
}

/// Sorts by score descending, then key ascending. Runs of scores whose
/// adjacent gaps are all within `epsilon` are treated as one tie and
/// re-ordered by key alone.
pub(crate) fn order_by_score<K: Ord>(mut items: Vec<(K, f64)>, epsilon: f64) -> Vec<(K, f64)> {
    items.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut start = 0;
    for i in 1..=items.len() {
        if i == items.len() || items[i - 1].1 - items[i].1 > epsilon {
            items[start..i].sort_by(|a, b| a.0.cmp(&b.0));
            start = i;
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, score: f64) -> ScoreEntry {
        ScoreEntry {
            strategy: id.into(),
            score,
            contributions: Vec::new(),
        }
    }

    fn order(result: &RankedResult) -> Vec<&str> {
        result.iter().map(|e| e.strategy.as_str()).collect()
    }

    #[test]
    fn test_highest_score_ranks_first() {
        let result = Ranker::default().rank(&[entry("a", -0.5), entry("b", 1.2), entry("c", 0.3)]);

        assert_eq!(order(&result), vec!["b", "c", "a"]);
        assert_eq!(result.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_exact_ties_break_by_id() {
        let result = Ranker::default().rank(&[entry("zeta", 1.0), entry("alpha", 1.0), entry("mid", 2.0)]);

        assert_eq!(order(&result), vec!["mid", "alpha", "zeta"]);
        assert_eq!(result.rank_of(&"zeta".into()), Some(3));
    }

    #[test]
    fn test_near_ties_within_epsilon_break_by_id() {
        let ranker = Ranker::new(0.01).unwrap();
        let result = ranker.rank(&[entry("b", 1.005), entry("a", 1.0), entry("c", 0.5)]);

        assert_eq!(order(&result), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_epsilon_ties_chain_across_adjacent_scores() {
        let ranker = Ranker::new(0.1).unwrap();
        let result = ranker.rank(&[
            entry("d", 1.0),
            entry("c", 0.92),
            entry("b", 0.84),
            entry("a", 0.2),
        ]);

        assert_eq!(order(&result), vec!["b", "c", "d", "a"]);
    }

    #[test]
    fn test_signed_zero_scores_are_tied() {
        let result = Ranker::default().rank(&[entry("b", 0.0), entry("a", -0.0)]);
        assert_eq!(order(&result), vec!["a", "b"]);
    }

    #[test]
    fn test_invalid_epsilon_is_rejected() {
        assert!(matches!(Ranker::new(-0.1), Err(AnalyzerError::InvalidEpsilon(_))));
        assert!(matches!(Ranker::new(f64::NAN), Err(AnalyzerError::InvalidEpsilon(_))));
        assert!(matches!(Ranker::new(f64::INFINITY), Err(AnalyzerError::InvalidEpsilon(_))));
    }

    #[test]
    fn test_empty_input_gives_empty_ranking() {
        assert!(Ranker::default().rank(&[]).is_empty());
    }
}
