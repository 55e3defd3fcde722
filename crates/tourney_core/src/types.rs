use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TournamentError;

/// Default starting Elo for generated players
pub const DEFAULT_ELO: f64 = 1200.0;

/// K-factor applied when a player does not carry its own
pub const DEFAULT_K_FACTOR: f64 = 40.0;

/// Index of a player inside the population a tournament was built from.
pub type PlayerId = usize;

/// Latent skill of a player.
///
/// `mean` is the ground truth the simulation tries to recover. A positive
/// `std_dev` makes every match draw a fresh performance value around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    pub mean: f64,
    #[serde(default)]
    pub std_dev: f64,
}

impl Strength {
    pub fn fixed(mean: f64) -> Self {
        Self { mean, std_dev: 0.0 }
    }

    pub fn noisy(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// Performance for one match. Consumes no randomness when `std_dev` is zero.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.std_dev <= 0.0 {
            return self.mean;
        }
        // Box-Muller
        let u1: f64 = rng.gen::<f64>().max(1e-12);
        let u2: f64 = rng.gen::<f64>();
        let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        self.mean + z0 * self.std_dev
    }
}

/// A tournament participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Current rating, moved by every rated match
    pub elo: f64,
    /// Rating update gain
    pub k_factor: f64,
    /// Hidden from pairing and ranking; only the resolver looks at it
    pub true_strength: Strength,
}

impl Player {
    pub fn new(name: impl Into<String>, elo: f64, true_strength: f64) -> Self {
        Self {
            name: name.into(),
            elo,
            k_factor: DEFAULT_K_FACTOR,
            true_strength: Strength::fixed(true_strength),
        }
    }

    /// Player whose starting Elo equals their true strength.
    pub fn rated(name: impl Into<String>, elo: f64) -> Self {
        Self::new(name, elo, elo)
    }

    pub fn with_k_factor(mut self, k_factor: f64) -> Self {
        self.k_factor = k_factor;
        self
    }

    pub fn with_strength_noise(mut self, std_dev: f64) -> Self {
        self.true_strength.std_dev = std_dev;
        self
    }

    fn validate(&self) -> Result<(), TournamentError> {
        let finite = [
            ("elo", self.elo),
            ("k_factor", self.k_factor),
            ("strength", self.true_strength.mean),
            ("strength_std_dev", self.true_strength.std_dev),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(TournamentError::NonFinite {
                    name: self.name.clone(),
                    field,
                    value,
                });
            }
        }
        for (field, value) in [
            ("k_factor", self.k_factor),
            ("strength_std_dev", self.true_strength.std_dev),
        ] {
            if value < 0.0 {
                return Err(TournamentError::Negative {
                    name: self.name.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Check a population before it enters any tournament.
pub fn validate_players(players: &[Player]) -> Result<(), TournamentError> {
    if players.is_empty() {
        return Err(TournamentError::NoPlayers);
    }
    let mut seen = HashSet::with_capacity(players.len());
    for player in players {
        player.validate()?;
        if !seen.insert(player.name.as_str()) {
            return Err(TournamentError::DuplicateName(player.name.clone()));
        }
    }
    Ok(())
}

/// Result of a single match, from the first-listed player's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    FirstWins,
    SecondWins,
    Draw,
}

impl MatchOutcome {
    /// Points for the first player (1, 0.5 or 0)
    pub fn first_score(self) -> f64 {
        match self {
            MatchOutcome::FirstWins => 1.0,
            MatchOutcome::SecondWins => 0.0,
            MatchOutcome::Draw => 0.5,
        }
    }

    pub fn second_score(self) -> f64 {
        1.0 - self.first_score()
    }
}

/// How the resolver decides who wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionMode {
    /// Logistic draw on (possibly noisy) true strength
    ByTrueStrength,
    /// Logistic draw on current Elo
    ByCurrentRating,
    /// Higher true strength always wins
    DeterministicByStrength,
}

impl FromStr for ResolutionMode {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "by_true_strength" | "strength" | "niveau" => Ok(ResolutionMode::ByTrueStrength),
            "by_current_rating" | "rating" | "elo" => Ok(ResolutionMode::ByCurrentRating),
            "deterministic" | "deterministic_by_strength" => {
                Ok(ResolutionMode::DeterministicByStrength)
            }
            _ => Err(TournamentError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionMode::ByTrueStrength => "by_true_strength",
            ResolutionMode::ByCurrentRating => "by_current_rating",
            ResolutionMode::DeterministicByStrength => "deterministic",
        };
        f.write_str(name)
    }
}

/// Tournament format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    Swiss,
    RoundRobin,
    DoubleElimination,
    SingleElimination,
}

impl Format {
    /// Smallest population the format can run with.
    pub fn min_players(self) -> usize {
        match self {
            Format::Swiss | Format::RoundRobin => 1,
            Format::DoubleElimination | Format::SingleElimination => 2,
        }
    }
}

impl FromStr for Format {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "swiss" => Ok(Format::Swiss),
            "round_robin" | "roundrobin" | "rr" => Ok(Format::RoundRobin),
            "double_elimination" | "double_elim" | "double" => Ok(Format::DoubleElimination),
            "single_elimination" | "single_elim" | "single" | "knockout" => {
                Ok(Format::SingleElimination)
            }
            _ => Err(TournamentError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Swiss => "swiss",
            Format::RoundRobin => "round_robin",
            Format::DoubleElimination => "double_elimination",
            Format::SingleElimination => "single_elimination",
        };
        f.write_str(name)
    }
}

/// Borrow two distinct elements of a slice mutably.
pub(crate) fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b, "a player cannot face themselves");
    if a < b {
        let (lo, hi) = items.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
