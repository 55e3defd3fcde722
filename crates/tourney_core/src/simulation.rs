//! One tournament from population to ranking, whatever the format

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bracket::{BracketOutcome, DoubleElimination, SingleElimination};
use crate::controller::{FairnessEvent, RoundSnapshot, TournamentController};
use crate::error::TournamentError;
use crate::pairing::ScheduleOrder;
use crate::ranking::RankingResult;
use crate::resolver::{MatchResolver, ResolverConfig, DRAW_TOLERANCE};
use crate::types::{validate_players, Format, Player, ResolutionMode};

/// Everything needed to run one tournament besides the players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSettings {
    pub format: Format,
    pub mode: ResolutionMode,
    /// Swiss rounds. `None` plays ceil(log2(players)).
    pub rounds: Option<u32>,
    pub allow_draws: bool,
    pub draw_tolerance: f64,
    pub update_ratings: bool,
    /// Seed brackets by rating instead of at random
    pub seed_by_rating: bool,
    pub schedule: ScheduleOrder,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            format: Format::Swiss,
            mode: ResolutionMode::ByTrueStrength,
            rounds: None,
            allow_draws: false,
            draw_tolerance: DRAW_TOLERANCE,
            update_ratings: true,
            seed_by_rating: true,
            schedule: ScheduleOrder::Shuffled,
        }
    }
}

impl TournamentSettings {
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            mode: self.mode,
            allow_draws: self.allow_draws,
            draw_tolerance: self.draw_tolerance,
            update_ratings: self.update_ratings,
        }
    }

    pub fn validate(&self) -> Result<(), TournamentError> {
        if let Some(0) = self.rounds {
            return Err(TournamentError::InvalidRoundCount(0));
        }
        self.resolver_config().validate()
    }

    /// Swiss round count for a field of `player_count`
    pub fn swiss_rounds(&self, player_count: usize) -> u32 {
        self.rounds.unwrap_or_else(|| default_swiss_rounds(player_count))
    }
}

/// ceil(log2(n)), at least one round
pub fn default_swiss_rounds(player_count: usize) -> u32 {
    player_count.max(2).next_power_of_two().trailing_zeros()
}

/// A finished tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentOutcome {
    pub format: Format,
    pub ranking: RankingResult,
    /// Per-round standings; empty for brackets
    pub snapshots: Vec<RoundSnapshot>,
    /// Player states at the end, ratings included
    pub players: Vec<Player>,
    pub events: Vec<FairnessEvent>,
    pub bracket: Option<BracketOutcome>,
}

/// Run one tournament over `players` and rank them.
///
/// Every configuration problem is reported before the first match.
pub fn simulate<R: Rng + ?Sized>(
    mut players: Vec<Player>,
    settings: &TournamentSettings,
    rng: &mut R,
) -> Result<TournamentOutcome, TournamentError> {
    settings.validate()?;
    validate_players(&players)?;
    let resolver = MatchResolver::new(settings.resolver_config())?;
    debug!(
        "{} tournament, {} players, {}",
        settings.format,
        players.len(),
        settings.mode
    );

    match settings.format {
        Format::Swiss | Format::RoundRobin => {
            let mut controller = TournamentController::new(players, resolver)?;
            let ranking = if settings.format == Format::Swiss {
                let rounds = settings.swiss_rounds(controller.players().len());
                controller.run_swiss(rounds, rng)?
            } else {
                controller.run_full_round_robin(settings.schedule, rng)
            };
            let snapshots = controller.snapshots().to_vec();
            let events = controller.fairness_events().to_vec();
            Ok(TournamentOutcome {
                format: settings.format,
                ranking,
                snapshots,
                players: controller.into_players(),
                events,
                bracket: None,
            })
        }
        Format::DoubleElimination | Format::SingleElimination => {
            let bracket = if settings.format == Format::DoubleElimination {
                DoubleElimination::new(&players, settings.seed_by_rating, rng)?
                    .run(&mut players, &resolver, rng)
            } else {
                SingleElimination::new(&players, settings.seed_by_rating, rng)?
                    .run(&mut players, &resolver, rng)
            };
            Ok(TournamentOutcome {
                format: settings.format,
                ranking: bracket.ranking.clone(),
                snapshots: Vec::new(),
                players,
                events: Vec::new(),
                bracket: Some(bracket),
            })
        }
    }
}

#[cfg(test)]
#[path = "simulation_tests.rs"]
mod simulation_tests;
