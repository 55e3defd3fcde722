//! Final rankings as ordered tie-groups

use serde::{Deserialize, Serialize};

use crate::types::{Player, PlayerId};

/// Player ids sorted by score, then rating, both descending.
///
/// Exact ties keep population order, so the result never depends on
/// anything but the inputs.
pub fn standings_order(players: &[Player], scores: &[f64]) -> Vec<PlayerId> {
    let mut order: Vec<PlayerId> = (0..players.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .total_cmp(&scores[a])
            .then_with(|| players[b].elo.total_cmp(&players[a].elo))
    });
    order
}

/// Players sharing one rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieGroup {
    /// 1-based rank of every member
    pub rank: usize,
    pub players: Vec<PlayerId>,
}

/// Best-to-worst sequence of tie-groups.
///
/// Ranks follow competition numbering: a two-way tie at rank 5 is followed
/// by rank 7.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingResult {
    groups: Vec<TieGroup>,
}

impl RankingResult {
    /// Build from groups listed best first. Empty groups are dropped.
    pub fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = Vec<PlayerId>>,
    {
        let mut rank = 1;
        let groups = groups
            .into_iter()
            .filter(|g| !g.is_empty())
            .map(|players| {
                let group = TieGroup { rank, players };
                rank += group.players.len();
                group
            })
            .collect();
        Self { groups }
    }

    /// Rank by standings. Only equal score and equal rating share a rank.
    pub fn by_standings(players: &[Player], scores: &[f64]) -> Self {
        let order = standings_order(players, scores);
        let mut groups: Vec<Vec<PlayerId>> = Vec::new();
        let mut prev: Option<PlayerId> = None;

        for id in order {
            let tied = prev
                .is_some_and(|p| scores[p] == scores[id] && players[p].elo == players[id].elo);
            match groups.last_mut() {
                Some(last) if tied => last.push(id),
                _ => groups.push(vec![id]),
            }
            prev = Some(id);
        }
        Self::from_groups(groups)
    }

    pub fn groups(&self) -> &[TieGroup] {
        &self.groups
    }

    /// Total number of ranked players
    pub fn player_count(&self) -> usize {
        self.groups.iter().map(|g| g.players.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn rank_of(&self, player: PlayerId) -> Option<usize> {
        self.groups
            .iter()
            .find(|g| g.players.contains(&player))
            .map(|g| g.rank)
    }

    /// Rank of each player id in `0..player_count`
    pub fn ranks_by_player(&self, player_count: usize) -> Vec<Option<usize>> {
        let mut ranks = vec![None; player_count];
        for group in &self.groups {
            for &id in &group.players {
                if let Some(slot) = ranks.get_mut(id) {
                    *slot = Some(group.rank);
                }
            }
        }
        ranks
    }

    /// Players best first, ties in group order
    pub fn flatten(&self) -> Vec<PlayerId> {
        self.groups
            .iter()
            .flat_map(|g| g.players.iter().copied())
            .collect()
    }

    /// The sole winner, if first place is not shared
    pub fn champion(&self) -> Option<PlayerId> {
        match self.groups.first() {
            Some(group) if group.players.len() == 1 => Some(group.players[0]),
            _ => None,
        }
    }

    /// Whether ids `0..player_count` each appear exactly once
    pub fn is_partition_of(&self, player_count: usize) -> bool {
        let mut seen = vec![false; player_count];
        for id in self.flatten() {
            match seen.get_mut(id) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        seen.into_iter().all(|s| s)
    }

    /// Group members by name, for reports and serialized results
    pub fn names(&self, players: &[Player]) -> Vec<Vec<String>> {
        self.groups
            .iter()
            .map(|g| g.players.iter().map(|&id| players[id].name.clone()).collect())
            .collect()
    }
}

#[cfg(test)]
#[path = "ranking_tests.rs"]
mod ranking_tests;
