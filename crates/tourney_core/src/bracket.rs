//! Elimination brackets
//!
//! Double elimination runs a winner and a loser bracket side by side until
//! each holds one player, then settles the title in a grand final with a
//! possible bracket reset. Single elimination is the winner bracket alone.
//!
//! Bracket matches cannot end level: both engines resolve with draws
//! disabled.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TournamentError;
use crate::pairing::{pair_bracket_round, BracketSeeding, Pairing, PairingSet};
use crate::ranking::RankingResult;
use crate::resolver::MatchResolver;
use crate::types::{Format, MatchOutcome, Player, PlayerId};

/// Where a double-elimination bracket stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BracketPhase {
    /// Winner/loser bracket rounds still to play
    Running,
    /// One player left on each side
    GrandFinal,
    /// The loser-bracket champion won the grand final
    Reset,
    Done,
}

/// Finished bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketOutcome {
    pub ranking: RankingResult,
    pub champion: PlayerId,
    pub runner_up: Option<PlayerId>,
    /// A bracket-reset match was played
    pub bracket_reset: bool,
    pub matches_played: usize,
    /// Matches lost by each player id
    pub losses: Vec<u32>,
    /// Bracket rounds before the final(s)
    pub rounds: u32,
}

/// Initial bracket order: by rating, or a uniform shuffle.
fn seed_bracket<R: Rng + ?Sized>(
    players: &[Player],
    seed_by_rating: bool,
    rng: &mut R,
) -> Vec<PlayerId> {
    let mut seeds: Vec<PlayerId> = (0..players.len()).collect();
    if seed_by_rating {
        seeds.sort_by(|&a, &b| players[b].elo.total_cmp(&players[a].elo));
    } else {
        seeds.shuffle(rng);
    }
    seeds
}

fn check_population(format: Format, players: &[Player]) -> Result<(), TournamentError> {
    let min = format.min_players();
    if players.len() < min {
        return Err(TournamentError::NotEnoughPlayers {
            format,
            min,
            count: players.len(),
        });
    }
    Ok(())
}

/// Match bookkeeping shared by both bracket kinds
#[derive(Debug, Clone)]
struct Ledger {
    losses: Vec<u32>,
    matches_played: usize,
}

impl Ledger {
    fn new(player_count: usize) -> Self {
        Self {
            losses: vec![0; player_count],
            matches_played: 0,
        }
    }

    /// Play one decisive match and return (winner, loser).
    fn decide<R: Rng + ?Sized>(
        &mut self,
        players: &mut [Player],
        resolver: &MatchResolver,
        first: PlayerId,
        second: PlayerId,
        rng: &mut R,
    ) -> (PlayerId, PlayerId) {
        let (winner, loser) = match resolver.resolve_in(players, first, second, rng) {
            MatchOutcome::SecondWins => (second, first),
            MatchOutcome::FirstWins | MatchOutcome::Draw => (first, second),
        };
        self.losses[loser] += 1;
        self.matches_played += 1;
        (winner, loser)
    }

    /// Play a bracket round; byes advance. Returns (advancing, beaten).
    fn play_round<R: Rng + ?Sized>(
        &mut self,
        set: &PairingSet,
        players: &mut [Player],
        resolver: &MatchResolver,
        rng: &mut R,
    ) -> (Vec<PlayerId>, Vec<PlayerId>) {
        let mut advancing = Vec::with_capacity(set.pairings.len());
        let mut beaten = Vec::with_capacity(set.pairings.len());
        for pairing in &set.pairings {
            match *pairing {
                Pairing::Bye(id) => advancing.push(id),
                Pairing::Match(a, b) => {
                    let (winner, loser) = self.decide(players, resolver, a, b, rng);
                    advancing.push(winner);
                    beaten.push(loser);
                }
            }
        }
        (advancing, beaten)
    }
}

/// Double-elimination state machine
#[derive(Debug, Clone)]
pub struct DoubleElimination {
    winners: Vec<PlayerId>,
    losers: Vec<PlayerId>,
    /// Loser-bracket eliminations, oldest first; one tie group per round
    eliminated: Vec<Vec<PlayerId>>,
    phase: BracketPhase,
    ledger: Ledger,
    round: u32,
    bracket_reset: bool,
    champion: Option<PlayerId>,
    runner_up: Option<PlayerId>,
}

impl DoubleElimination {
    /// Seed a bracket. Two players go straight to the grand final, the top
    /// seed on the winner side.
    pub fn new<R: Rng + ?Sized>(
        players: &[Player],
        seed_by_rating: bool,
        rng: &mut R,
    ) -> Result<Self, TournamentError> {
        check_population(Format::DoubleElimination, players)?;
        let mut winners = seed_bracket(players, seed_by_rating, rng);
        let (losers, phase) = if winners.len() == 2 {
            (winners.split_off(1), BracketPhase::GrandFinal)
        } else {
            (Vec::new(), BracketPhase::Running)
        };

        Ok(Self {
            winners,
            losers,
            eliminated: Vec::new(),
            phase,
            ledger: Ledger::new(players.len()),
            round: 0,
            bracket_reset: false,
            champion: None,
            runner_up: None,
        })
    }

    pub fn phase(&self) -> BracketPhase {
        self.phase
    }

    pub fn winner_bracket(&self) -> &[PlayerId] {
        &self.winners
    }

    pub fn loser_bracket(&self) -> &[PlayerId] {
        &self.losers
    }

    pub fn elimination_groups(&self) -> &[Vec<PlayerId>] {
        &self.eliminated
    }

    /// Advance by one bracket round, the grand final, or the reset.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        players: &mut [Player],
        resolver: &MatchResolver,
        rng: &mut R,
    ) {
        let resolver = resolver.without_draws();
        match self.phase {
            BracketPhase::Running => self.play_bracket_round(players, &resolver, rng),
            BracketPhase::GrandFinal => self.play_grand_final(players, &resolver, rng),
            BracketPhase::Reset => self.play_reset(players, &resolver, rng),
            BracketPhase::Done => {}
        }
    }

    /// Play to completion.
    pub fn run<R: Rng + ?Sized>(
        mut self,
        players: &mut [Player],
        resolver: &MatchResolver,
        rng: &mut R,
    ) -> BracketOutcome {
        while self.phase != BracketPhase::Done {
            self.step(players, resolver, rng);
        }
        self.finish()
    }

    fn play_bracket_round<R: Rng + ?Sized>(
        &mut self,
        players: &mut [Player],
        resolver: &MatchResolver,
        rng: &mut R,
    ) {
        self.round += 1;

        let mut dropped = Vec::new();
        if self.winners.len() > 1 {
            let set = pair_bracket_round(
                self.round,
                &self.winners,
                players,
                BracketSeeding::HighLow,
                rng,
            );
            let (advancing, beaten) = self.ledger.play_round(&set, players, resolver, rng);
            self.winners = advancing;
            dropped = beaten;
        }

        if self.losers.len() > 1 {
            let set = pair_bracket_round(
                self.round,
                &self.losers,
                players,
                BracketSeeding::Random,
                rng,
            );
            let (advancing, beaten) = self.ledger.play_round(&set, players, resolver, rng);
            self.losers = advancing;
            if !beaten.is_empty() {
                self.eliminated.push(beaten);
            }
        }

        // This round's winner-bracket losers only meet the loser bracket next round
        self.losers.extend(dropped);

        debug!(
            "bracket round {}: {} in winners, {} in losers, {} groups out",
            self.round,
            self.winners.len(),
            self.losers.len(),
            self.eliminated.len()
        );

        if self.winners.len() <= 1 && self.losers.len() <= 1 {
            self.phase = BracketPhase::GrandFinal;
        }
    }

    fn play_grand_final<R: Rng + ?Sized>(
        &mut self,
        players: &mut [Player],
        resolver: &MatchResolver,
        rng: &mut R,
    ) {
        // A loser-bracket match always leaves a survivor, so both sides are filled
        debug_assert_eq!((self.winners.len(), self.losers.len()), (1, 1));
        let (wb, lb) = (self.winners[0], self.losers[0]);

        let (winner, _) = self.ledger.decide(players, resolver, wb, lb, rng);
        if winner == wb {
            self.champion = Some(wb);
            self.runner_up = Some(lb);
            self.phase = BracketPhase::Done;
        } else {
            debug!("grand final lost by winner-bracket champion, bracket reset");
            self.phase = BracketPhase::Reset;
        }
    }

    fn play_reset<R: Rng + ?Sized>(
        &mut self,
        players: &mut [Player],
        resolver: &MatchResolver,
        rng: &mut R,
    ) {
        let (winner, loser) = self
            .ledger
            .decide(players, resolver, self.winners[0], self.losers[0], rng);
        self.bracket_reset = true;
        self.champion = Some(winner);
        self.runner_up = Some(loser);
        self.phase = BracketPhase::Done;
    }

    fn finish(self) -> BracketOutcome {
        let champion = self.champion.unwrap_or(self.winners[0]);
        let top = std::iter::once(vec![champion]).chain(self.runner_up.map(|r| vec![r]));
        let ranking = RankingResult::from_groups(top.chain(self.eliminated.into_iter().rev()));

        BracketOutcome {
            ranking,
            champion,
            runner_up: self.runner_up,
            bracket_reset: self.bracket_reset,
            matches_played: self.ledger.matches_played,
            losses: self.ledger.losses,
            rounds: self.round,
        }
    }
}

/// Knockout bracket: one loss and you are out
#[derive(Debug, Clone)]
pub struct SingleElimination {
    alive: Vec<PlayerId>,
    /// Losers of each round, oldest first
    eliminated: Vec<Vec<PlayerId>>,
    ledger: Ledger,
    round: u32,
}

impl SingleElimination {
    pub fn new<R: Rng + ?Sized>(
        players: &[Player],
        seed_by_rating: bool,
        rng: &mut R,
    ) -> Result<Self, TournamentError> {
        check_population(Format::SingleElimination, players)?;
        Ok(Self {
            alive: seed_bracket(players, seed_by_rating, rng),
            eliminated: Vec::new(),
            ledger: Ledger::new(players.len()),
            round: 0,
        })
    }

    pub fn remaining(&self) -> &[PlayerId] {
        &self.alive
    }

    pub fn is_done(&self) -> bool {
        self.alive.len() <= 1
    }

    /// Play one round.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        players: &mut [Player],
        resolver: &MatchResolver,
        rng: &mut R,
    ) {
        if self.is_done() {
            return;
        }
        self.round += 1;
        let resolver = resolver.without_draws();
        let set = pair_bracket_round(
            self.round,
            &self.alive,
            players,
            BracketSeeding::HighLow,
            rng,
        );
        let (advancing, beaten) = self.ledger.play_round(&set, players, &resolver, rng);
        debug!(
            "knockout round {}: {} advance, {} out",
            self.round,
            advancing.len(),
            beaten.len()
        );
        self.alive = advancing;
        self.eliminated.push(beaten);
    }

    pub fn run<R: Rng + ?Sized>(
        mut self,
        players: &mut [Player],
        resolver: &MatchResolver,
        rng: &mut R,
    ) -> BracketOutcome {
        while !self.is_done() {
            self.step(players, resolver, rng);
        }
        let champion = self.alive[0];
        let runner_up = self.eliminated.last().and_then(|g| g.first().copied());
        let ranking = RankingResult::from_groups(
            std::iter::once(vec![champion]).chain(self.eliminated.into_iter().rev()),
        );

        BracketOutcome {
            ranking,
            champion,
            runner_up,
            bracket_reset: false,
            matches_played: self.ledger.matches_played,
            losses: self.ledger.losses,
            rounds: self.round,
        }
    }
}

#[cfg(test)]
#[path = "bracket_tests.rs"]
mod bracket_tests;
