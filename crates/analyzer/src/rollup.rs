use crate::ranker::{RankedResult, order_by_score};
use core_types::StrategyId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A named set of strategies, e.g. the book of one portfolio manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyGroup {
    pub name: String,
    pub members: Vec<StrategyId>,
}

impl StrategyGroup {
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = impl Into<StrategyId>>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupScore {
    pub rank: usize,
    pub group: String,
    /// Mean composite score of the group's ranked members.
    pub score: f64,
    /// The members that were ranked; excluded or unknown members are left out.
    pub members: Vec<StrategyId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupRanking {
    pub entries: Vec<GroupScore>,
}

/// Ranks groups by the mean score of their ranked members, using the same
/// ordering rule as the strategy ranking. A member listed twice counts once.
/// Groups with no ranked member are omitted.
pub fn rollup(groups: &[StrategyGroup], ranking: &RankedResult, epsilon: f64) -> GroupRanking {
    let scores: HashMap<&StrategyId, f64> = ranking.iter().map(|e| (&e.strategy, e.score)).collect();

    let mut members_by_group: HashMap<&str, Vec<StrategyId>> = HashMap::new();
    let mut averaged = Vec::with_capacity(groups.len());
    for group in groups {
        let mut seen = HashSet::new();
        let ranked: Vec<(&StrategyId, f64)> = group
            .members
            .iter()
            .filter(|member| seen.insert(*member))
            .filter_map(|member| scores.get(member).map(|score| (member, *score)))
            .collect();

        if ranked.is_empty() {
            tracing::debug!(group = %group.name, "Group has no ranked members; omitted from rollup.");
            continue;
        }

        let mean = ranked.iter().map(|(_, s)| s).sum::<f64>() / ranked.len() as f64;
        members_by_group.insert(
            group.name.as_str(),
            ranked.into_iter().map(|(id, _)| id.clone()).collect(),
        );
        averaged.push((group.name.as_str(), mean));
    }

    let entries = order_by_score(averaged, epsilon)
        .into_iter()
        .enumerate()
        .map(|(position, (name, score))| GroupScore {
            rank: position + 1,
            group: name.to_string(),
            score,
            members: members_by_group.remove(name).unwrap_or_default(),
        })
        .collect();

    GroupRanking { entries }
}
