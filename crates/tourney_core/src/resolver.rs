//! Match resolution: turns a pairing into an outcome

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TournamentError;
use crate::rating::{expected_score, update_ratings};
use crate::types::{pair_mut, MatchOutcome, Player, PlayerId, ResolutionMode};

/// Width of the band around the win probability that counts as a draw
pub const DRAW_TOLERANCE: f64 = 0.01;

/// Configuration for match resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub mode: ResolutionMode,
    /// Whether a draw can come out of a match
    pub allow_draws: bool,
    /// Half-width of the draw band
    pub draw_tolerance: f64,
    /// Apply Elo updates after each match. Disabled for what-if brackets.
    pub update_ratings: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            mode: ResolutionMode::ByTrueStrength,
            allow_draws: false,
            draw_tolerance: DRAW_TOLERANCE,
            update_ratings: true,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), TournamentError> {
        if !(0.0..=0.5).contains(&self.draw_tolerance) {
            return Err(TournamentError::InvalidDrawTolerance(self.draw_tolerance));
        }
        Ok(())
    }
}

/// Resolves single matches under a fixed resolution mode
#[derive(Debug, Clone)]
pub struct MatchResolver {
    config: ResolverConfig,
}

impl MatchResolver {
    pub fn new(config: ResolverConfig) -> Result<Self, TournamentError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Resolver for a mode with every other setting at its default
    pub fn with_mode(mode: ResolutionMode) -> Self {
        Self {
            config: ResolverConfig {
                mode,
                ..Default::default()
            },
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Same resolver for matches that must produce a winner
    pub fn without_draws(&self) -> Self {
        Self {
            config: ResolverConfig {
                allow_draws: false,
                ..self.config
            },
        }
    }

    /// Play one match between `first` and `second`.
    ///
    /// Returns the result from `first`'s perspective. Ratings are updated in
    /// place when the configuration asks for it.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        first: &mut Player,
        second: &mut Player,
        rng: &mut R,
    ) -> MatchOutcome {
        let outcome = match self.config.mode {
            ResolutionMode::DeterministicByStrength => self.by_strength_order(first, second),
            ResolutionMode::ByTrueStrength => {
                let perf_first = first.true_strength.sample(rng);
                let perf_second = second.true_strength.sample(rng);
                self.draw_outcome(expected_score(perf_first, perf_second), rng)
            }
            ResolutionMode::ByCurrentRating => {
                self.draw_outcome(expected_score(first.elo, second.elo), rng)
            }
        };

        if self.config.update_ratings {
            update_ratings(first, second, outcome);
        }
        outcome
    }

    /// [`resolve`](Self::resolve) for two members of the same population.
    pub fn resolve_in<R: Rng + ?Sized>(
        &self,
        players: &mut [Player],
        first: PlayerId,
        second: PlayerId,
        rng: &mut R,
    ) -> MatchOutcome {
        let (a, b) = pair_mut(players, first, second);
        self.resolve(a, b, rng)
    }

    /// Draw an outcome from the first player's win probability.
    ///
    /// A uniform value within `draw_tolerance` of `p_first` is a draw; below
    /// that the first player wins, above it the second.
    pub fn draw_outcome<R: Rng + ?Sized>(&self, p_first: f64, rng: &mut R) -> MatchOutcome {
        let roll: f64 = rng.gen();
        if self.config.allow_draws && (p_first - roll).abs() < self.config.draw_tolerance {
            MatchOutcome::Draw
        } else if roll < p_first {
            MatchOutcome::FirstWins
        } else {
            MatchOutcome::SecondWins
        }
    }

    fn by_strength_order(&self, first: &Player, second: &Player) -> MatchOutcome {
        let (a, b) = (first.true_strength.mean, second.true_strength.mean);
        if a > b {
            MatchOutcome::FirstWins
        } else if b > a {
            MatchOutcome::SecondWins
        } else if self.config.allow_draws {
            MatchOutcome::Draw
        } else {
            MatchOutcome::FirstWins
        }
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod resolver_tests;
