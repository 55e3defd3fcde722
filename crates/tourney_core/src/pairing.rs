//! Pairing generation for Swiss rounds, bracket rounds and round-robin schedules
//!
//! Everything here is a pure function of the standings it is handed. Applying
//! byes, scores and opponent history is left to the caller that owns them.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TournamentError;
use crate::ranking::standings_order;
use crate::types::{Player, PlayerId};

/// Upper bound on backtracking steps for one Swiss round
pub const PAIRING_STEP_BUDGET: usize = 200_000;

/// One entry of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pairing {
    Match(PlayerId, PlayerId),
    Bye(PlayerId),
}

/// All pairings for one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingSet {
    pub round: u32,
    pub pairings: Vec<Pairing>,
    /// Rematches were allowed because no rematch-free pairing exists
    pub rematch_fallback: bool,
    /// The backtracking search ran out of steps and a maximum matching
    /// settled the round, possibly further from the standings
    pub search_truncated: bool,
    /// Every candidate had already received a bye
    pub bye_reused: bool,
}

impl PairingSet {
    pub fn matches(&self) -> impl Iterator<Item = (PlayerId, PlayerId)> + '_ {
        self.pairings.iter().filter_map(|p| match *p {
            Pairing::Match(a, b) => Some((a, b)),
            Pairing::Bye(_) => None,
        })
    }

    pub fn byes(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.pairings.iter().filter_map(|p| match *p {
            Pairing::Bye(id) => Some(id),
            Pairing::Match(..) => None,
        })
    }

    /// Every player in the round, in pairing order
    pub fn participants(&self) -> Vec<PlayerId> {
        self.pairings
            .iter()
            .flat_map(|p| match *p {
                Pairing::Match(a, b) => vec![a, b],
                Pairing::Bye(id) => vec![id],
            })
            .collect()
    }
}

/// Who has played whom so far in a tournament
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpponentHistory {
    faced: Vec<HashSet<PlayerId>>,
}

impl OpponentHistory {
    pub fn new(player_count: usize) -> Self {
        Self {
            faced: vec![HashSet::new(); player_count],
        }
    }

    pub fn record(&mut self, a: PlayerId, b: PlayerId) {
        self.faced[a].insert(b);
        self.faced[b].insert(a);
    }

    pub fn has_faced(&self, a: PlayerId, b: PlayerId) -> bool {
        self.faced[a].contains(&b)
    }

    pub fn opponents(&self, player: PlayerId) -> &HashSet<PlayerId> {
        &self.faced[player]
    }

    /// Number of distinct pairs that have met
    pub fn distinct_pairs(&self) -> usize {
        self.faced.iter().map(HashSet::len).sum::<usize>() / 2
    }
}

/// Pairings for one Swiss round.
///
/// Players are ordered by standings. An odd field gives the bye to the
/// lowest-ranked player without one (or the lowest-ranked player outright
/// once everybody has had one, flagged as `bye_reused`). The rest are paired
/// without rematches when possible, otherwise adjacently with
/// `rematch_fallback` set.
pub fn pair_swiss_round(
    round: u32,
    players: &[Player],
    scores: &[f64],
    history: &OpponentHistory,
    had_bye: &[bool],
) -> PairingSet {
    pair_swiss_round_within(round, players, scores, history, had_bye, PAIRING_STEP_BUDGET)
}

/// [`pair_swiss_round`] with an explicit bound on backtracking steps.
///
/// When the bound is hit, a maximum matching over the not-yet-met pairs
/// decides whether a rematch-free pairing exists at all. Rematches are only
/// allowed once it proves there is none.
pub fn pair_swiss_round_within(
    round: u32,
    players: &[Player],
    scores: &[f64],
    history: &OpponentHistory,
    had_bye: &[bool],
    budget: usize,
) -> PairingSet {
    let mut order = standings_order(players, scores);
    let mut pairings = Vec::with_capacity(order.len() / 2 + 1);
    let mut bye_reused = false;

    if order.len() % 2 == 1 {
        let pos = match order.iter().rposition(|&id| !had_bye[id]) {
            Some(pos) => pos,
            None => {
                bye_reused = true;
                order.len() - 1
            }
        };
        pairings.push(Pairing::Bye(order.remove(pos)));
    }

    let mut search_truncated = false;
    let (pairs, rematch_fallback) = match find_pairing(&order, history, budget) {
        PairingSearch::Found(pairs) => (pairs, false),
        PairingSearch::Exhausted => (adjacent_pairing(&order), true),
        PairingSearch::BudgetExceeded => {
            search_truncated = true;
            match rematch_free_matching(&order, history) {
                Some(pairs) => (pairs, false),
                None => (adjacent_pairing(&order), true),
            }
        }
    };
    pairings.extend(pairs.into_iter().map(|(a, b)| Pairing::Match(a, b)));

    PairingSet {
        round,
        pairings,
        rematch_fallback,
        search_truncated,
        bye_reused,
    }
}

/// Result of the backtracking search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingSearch {
    Found(Vec<(PlayerId, PlayerId)>),
    /// Every branch was tried; no rematch-free pairing exists
    Exhausted,
    /// The step bound ran out before the search finished
    BudgetExceeded,
}

/// Rematch-free pairing of `order` by depth-first search.
///
/// The highest unpaired player takes the nearest player below them they have
/// not met; dead ends backtrack to that player's next candidate. The stack
/// never holds more than `order.len() / 2` choices.
pub fn find_pairing(
    order: &[PlayerId],
    history: &OpponentHistory,
    budget: usize,
) -> PairingSearch {
    let n = order.len();
    if n % 2 != 0 {
        return PairingSearch::Exhausted;
    }

    let mut used = vec![false; n];
    // (first, partner) as positions in `order`
    let mut stack: Vec<(usize, usize)> = Vec::with_capacity(n / 2);
    let mut resume_from: Option<usize> = None;
    let mut steps = 0;

    while stack.len() < n / 2 {
        steps += 1;
        if steps > budget {
            return PairingSearch::BudgetExceeded;
        }

        let Some(first) = used.iter().position(|&u| !u) else {
            break;
        };
        let start = resume_from.take().unwrap_or(first + 1);
        let partner =
            (start..n).find(|&j| !used[j] && !history.has_faced(order[first], order[j]));

        match partner {
            Some(j) => {
                used[first] = true;
                used[j] = true;
                stack.push((first, j));
            }
            None => {
                let Some((prev_first, prev_partner)) = stack.pop() else {
                    return PairingSearch::Exhausted;
                };
                used[prev_first] = false;
                used[prev_partner] = false;
                resume_from = Some(prev_partner + 1);
            }
        }
    }

    PairingSearch::Found(stack.into_iter().map(|(a, b)| (order[a], order[b])).collect())
}

/// Rematch-free pairing of all of `order`, if one exists.
///
/// Runs Edmonds' blossom algorithm on the graph of pairs that have not met,
/// so the answer is exact in polynomial time. Pairs are listed by the
/// position of their higher-placed player.
pub fn rematch_free_matching(
    order: &[PlayerId],
    history: &OpponentHistory,
) -> Option<Vec<(PlayerId, PlayerId)>> {
    let n = order.len();
    if n % 2 != 0 {
        return None;
    }
    let adj: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| j != i && !history.has_faced(order[i], order[j]))
                .collect()
        })
        .collect();

    let mate = Blossom::new(&adj).maximum_matching();
    let mut pairs = Vec::with_capacity(n / 2);
    for (i, partner) in mate.iter().enumerate() {
        match *partner {
            Some(j) if i < j => pairs.push((order[i], order[j])),
            Some(_) => {}
            None => return None,
        }
    }
    Some(pairs)
}

/// Working state of the blossom algorithm over vertices `0..adj.len()`
struct Blossom<'a> {
    adj: &'a [Vec<usize>],
    mate: Vec<Option<usize>>,
    parent: Vec<Option<usize>>,
    base: Vec<usize>,
    in_tree: Vec<bool>,
    queue: VecDeque<usize>,
}

impl<'a> Blossom<'a> {
    fn new(adj: &'a [Vec<usize>]) -> Self {
        let n = adj.len();
        Self {
            adj,
            mate: vec![None; n],
            parent: vec![None; n],
            base: (0..n).collect(),
            in_tree: vec![false; n],
            queue: VecDeque::new(),
        }
    }

    fn maximum_matching(mut self) -> Vec<Option<usize>> {
        for root in 0..self.adj.len() {
            if self.mate[root].is_some() {
                continue;
            }
            let Some(mut v) = self.augmenting_path(root) else {
                continue;
            };
            // Flip matched and unmatched edges back to the root
            loop {
                let Some(pv) = self.parent[v] else {
                    break;
                };
                let next = self.mate[pv];
                self.mate[v] = Some(pv);
                self.mate[pv] = Some(v);
                match next {
                    Some(ppv) => v = ppv,
                    None => break,
                }
            }
        }
        self.mate
    }

    /// Alternating-tree search from `root`; returns the free vertex reached.
    fn augmenting_path(&mut self, root: usize) -> Option<usize> {
        let n = self.adj.len();
        self.in_tree.fill(false);
        self.parent.fill(None);
        for (i, b) in self.base.iter_mut().enumerate() {
            *b = i;
        }
        self.in_tree[root] = true;
        self.queue.clear();
        self.queue.push_back(root);

        let adj = self.adj;
        while let Some(v) = self.queue.pop_front() {
            for &to in &adj[v] {
                if self.base[v] == self.base[to] || self.mate[v] == Some(to) {
                    continue;
                }
                let to_is_outer =
                    to == root || self.mate[to].is_some_and(|m| self.parent[m].is_some());
                if to_is_outer {
                    // Odd cycle: contract it onto its base
                    let cycle_base = self.common_ancestor(v, to);
                    let mut in_blossom = vec![false; n];
                    self.mark_path(v, cycle_base, to, &mut in_blossom);
                    self.mark_path(to, cycle_base, v, &mut in_blossom);
                    for i in 0..n {
                        if in_blossom[self.base[i]] {
                            self.base[i] = cycle_base;
                            if !self.in_tree[i] {
                                self.in_tree[i] = true;
                                self.queue.push_back(i);
                            }
                        }
                    }
                } else if self.parent[to].is_none() {
                    self.parent[to] = Some(v);
                    match self.mate[to] {
                        None => return Some(to),
                        Some(m) => {
                            self.in_tree[m] = true;
                            self.queue.push_back(m);
                        }
                    }
                }
            }
        }
        None
    }

    fn step_up(&self, v: usize) -> Option<usize> {
        self.mate[v].and_then(|m| self.parent[m])
    }

    fn common_ancestor(&self, mut a: usize, mut b: usize) -> usize {
        let mut seen = vec![false; self.adj.len()];
        loop {
            a = self.base[a];
            seen[a] = true;
            match self.step_up(a) {
                Some(next) => a = next,
                None => break,
            }
        }
        loop {
            b = self.base[b];
            if seen[b] {
                return b;
            }
            match self.step_up(b) {
                Some(next) => b = next,
                None => return b,
            }
        }
    }

    fn mark_path(
        &mut self,
        mut v: usize,
        cycle_base: usize,
        mut child: usize,
        in_blossom: &mut [bool],
    ) {
        while self.base[v] != cycle_base {
            let Some(m) = self.mate[v] else {
                break;
            };
            in_blossom[self.base[v]] = true;
            in_blossom[self.base[m]] = true;
            self.parent[v] = Some(child);
            child = m;
            match self.parent[m] {
                Some(p) => v = p,
                None => break,
            }
        }
    }
}

/// 1v2, 3v4, ... ignoring history. A trailing odd player is left out.
pub fn adjacent_pairing(order: &[PlayerId]) -> Vec<(PlayerId, PlayerId)> {
    order.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

/// How a bracket round orders its entrants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BracketSeeding {
    /// Sorted by rating; the top seed byes, then best meets worst
    HighLow,
    /// Uniform shuffle; the bye and the pairs are random
    Random,
}

/// Pairings for one elimination-bracket round.
pub fn pair_bracket_round<R: Rng + ?Sized>(
    round: u32,
    entrants: &[PlayerId],
    players: &[Player],
    seeding: BracketSeeding,
    rng: &mut R,
) -> PairingSet {
    let mut pool = entrants.to_vec();
    let mut pairings = Vec::with_capacity(pool.len() / 2 + 1);

    match seeding {
        BracketSeeding::HighLow => {
            pool.sort_by(|&a, &b| players[b].elo.total_cmp(&players[a].elo));
            if pool.len() % 2 == 1 {
                pairings.push(Pairing::Bye(pool.remove(0)));
            }
            let n = pool.len();
            for i in 0..n / 2 {
                pairings.push(Pairing::Match(pool[i], pool[n - 1 - i]));
            }
        }
        BracketSeeding::Random => {
            pool.shuffle(rng);
            if pool.len() % 2 == 1 {
                pairings.push(Pairing::Bye(pool.remove(0)));
            }
            pairings.extend(pool.chunks_exact(2).map(|c| Pairing::Match(c[0], c[1])));
        }
    }

    PairingSet {
        round,
        pairings,
        rematch_fallback: false,
        search_truncated: false,
        bye_reused: false,
    }
}

/// Order in which a round-robin schedule is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScheduleOrder {
    /// (0,1), (0,2), ..., (1,2), ...
    Canonical,
    /// Canonical schedule shuffled with the tournament's RNG
    #[default]
    Shuffled,
}

impl FromStr for ScheduleOrder {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "canonical" | "ordered" => Ok(ScheduleOrder::Canonical),
            "shuffled" | "random" => Ok(ScheduleOrder::Shuffled),
            _ => Err(TournamentError::UnknownSchedule(s.to_string())),
        }
    }
}

impl fmt::Display for ScheduleOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleOrder::Canonical => f.write_str("canonical"),
            ScheduleOrder::Shuffled => f.write_str("shuffled"),
        }
    }
}

/// Every unordered pair of `player_count` players exactly once.
pub fn round_robin_schedule<R: Rng + ?Sized>(
    player_count: usize,
    order: ScheduleOrder,
    rng: &mut R,
) -> Vec<(PlayerId, PlayerId)> {
    let mut schedule = Vec::with_capacity(player_count * player_count.saturating_sub(1) / 2);
    for i in 0..player_count {
        for j in (i + 1)..player_count {
            schedule.push((i, j));
        }
    }
    if order == ScheduleOrder::Shuffled {
        schedule.shuffle(rng);
    }
    schedule
}

#[cfg(test)]
#[path = "pairing_tests.rs"]
mod pairing_tests;
