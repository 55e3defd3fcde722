//! Score-based tournaments: Swiss system and round robin
//!
//! The controller owns the players for the lifetime of the tournament along
//! with everything the pairing engine needs to see: scores, opponent history
//! and bye flags.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TournamentError;
use crate::pairing::{
    pair_swiss_round, round_robin_schedule, OpponentHistory, Pairing, PairingSet, ScheduleOrder,
};
use crate::ranking::RankingResult;
use crate::resolver::MatchResolver;
use crate::types::{validate_players, Player, PlayerId};

/// Points for a bye
pub const BYE_POINTS: f64 = 1.0;

/// One player's state after a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub round: u32,
    pub player: PlayerId,
    pub name: String,
    pub score: f64,
    pub elo: f64,
    pub true_strength: f64,
}

/// A round that had to relax a fairness rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FairnessEvent {
    /// No rematch-free pairing existed; adjacent pairing was used
    RematchFallback { round: u32 },
    /// The pairing search hit its step bound and a maximum matching was used
    SearchTruncated { round: u32 },
    /// Every player had already had a bye
    ByeReused { round: u32, player: PlayerId },
}

/// Runs Swiss and round-robin tournaments over an owned population
#[derive(Debug, Clone)]
pub struct TournamentController {
    players: Vec<Player>,
    scores: Vec<f64>,
    history: OpponentHistory,
    had_bye: Vec<bool>,
    resolver: MatchResolver,
    rounds: Vec<PairingSet>,
    snapshots: Vec<RoundSnapshot>,
    events: Vec<FairnessEvent>,
}

impl TournamentController {
    pub fn new(players: Vec<Player>, resolver: MatchResolver) -> Result<Self, TournamentError> {
        validate_players(&players)?;
        let n = players.len();
        Ok(Self {
            players,
            scores: vec![0.0; n],
            history: OpponentHistory::new(n),
            had_bye: vec![false; n],
            resolver,
            rounds: Vec::new(),
            snapshots: Vec::new(),
            events: Vec::new(),
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn into_players(self) -> Vec<Player> {
        self.players
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn history(&self) -> &OpponentHistory {
        &self.history
    }

    pub fn had_bye(&self, player: PlayerId) -> bool {
        self.had_bye[player]
    }

    /// Swiss pairings played so far
    pub fn rounds(&self) -> &[PairingSet] {
        &self.rounds
    }

    pub fn snapshots(&self) -> &[RoundSnapshot] {
        &self.snapshots
    }

    pub fn fairness_events(&self) -> &[FairnessEvent] {
        &self.events
    }

    /// Pair and play one Swiss round.
    ///
    /// Pairings depend on the standings left by the previous round, so
    /// rounds must be played in order.
    pub fn play_round<R: Rng + ?Sized>(&mut self, round: u32, rng: &mut R) -> &PairingSet {
        let set = pair_swiss_round(
            round,
            &self.players,
            &self.scores,
            &self.history,
            &self.had_bye,
        );

        if set.search_truncated {
            warn!("round {round}: pairing search ran out of steps, settled by maximum matching");
            self.events.push(FairnessEvent::SearchTruncated { round });
        }
        if set.rematch_fallback {
            warn!("round {round}: no rematch-free pairing, pairing adjacent players");
            self.events.push(FairnessEvent::RematchFallback { round });
        }

        for pairing in &set.pairings {
            match *pairing {
                Pairing::Bye(player) => {
                    if set.bye_reused {
                        warn!(
                            "round {round}: every player has had a bye, {} gets another",
                            self.players[player].name
                        );
                        self.events.push(FairnessEvent::ByeReused { round, player });
                    }
                    self.had_bye[player] = true;
                    self.scores[player] += BYE_POINTS;
                }
                Pairing::Match(a, b) => {
                    self.history.record(a, b);
                    self.play_match(a, b, rng);
                }
            }
        }

        debug!(
            "swiss round {round}: {} matches, {} byes",
            set.matches().count(),
            set.byes().count()
        );
        self.take_snapshot(round);
        self.rounds.push(set);
        &self.rounds[self.rounds.len() - 1]
    }

    /// Play `rounds` Swiss rounds and rank the field.
    pub fn run_swiss<R: Rng + ?Sized>(
        &mut self,
        rounds: u32,
        rng: &mut R,
    ) -> Result<RankingResult, TournamentError> {
        if rounds == 0 {
            return Err(TournamentError::InvalidRoundCount(rounds));
        }
        let first = self.rounds.len() as u32 + 1;
        for round in first..first + rounds {
            self.play_round(round, rng);
        }
        Ok(self.final_ranking())
    }

    /// Play every pairing once in the requested order and rank the field.
    pub fn run_full_round_robin<R: Rng + ?Sized>(
        &mut self,
        order: ScheduleOrder,
        rng: &mut R,
    ) -> RankingResult {
        let schedule = round_robin_schedule(self.players.len(), order, rng);
        debug!("round robin: {} matches ({order})", schedule.len());
        for (a, b) in schedule {
            self.history.record(a, b);
            self.play_match(a, b, rng);
        }
        self.take_snapshot(1);
        self.final_ranking()
    }

    /// Standings by score, rating as tiebreak.
    pub fn final_ranking(&self) -> RankingResult {
        RankingResult::by_standings(&self.players, &self.scores)
    }

    fn play_match<R: Rng + ?Sized>(&mut self, a: PlayerId, b: PlayerId, rng: &mut R) {
        let outcome = self.resolver.resolve_in(&mut self.players, a, b, rng);
        self.scores[a] += outcome.first_score();
        self.scores[b] += outcome.second_score();
    }

    fn take_snapshot(&mut self, round: u32) {
        let rows = self
            .players
            .iter()
            .zip(&self.scores)
            .enumerate()
            .map(|(id, (p, &score))| RoundSnapshot {
                round,
                player: id,
                name: p.name.clone(),
                score,
                elo: p.elo,
                true_strength: p.true_strength.mean,
            });
        self.snapshots.extend(rows);
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
