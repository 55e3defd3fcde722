//! Experiment configuration files
//!
//! An experiment is a roster plus tournament settings, replayed for a number
//! of seeded trials:
//!
//! ```toml
//! name = "belloy-swiss"
//! trials = 500
//! seed = 42
//!
//! [tournament]
//! format = "swiss"
//! mode = "by_true_strength"
//! rounds = 5
//!
//! [[players]]
//! name = "MARINI Manuel"
//! elo = 1820
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use tourney_core::{
    validate_players, Player, Strength, TournamentError, TournamentSettings, DEFAULT_K_FACTOR,
    DRAW_TOLERANCE,
};

/// Top-level experiment file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub name: String,
    #[serde(default = "default_trials")]
    pub trials: usize,
    #[serde(default)]
    pub seed: u64,
    /// Worker threads; the rayon default when absent
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub tournament: TournamentSection,
    pub players: Vec<PlayerEntry>,
}

fn default_trials() -> usize {
    100
}

/// `[tournament]` table. Selectors stay strings until [`ExperimentConfig::settings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentSection {
    pub format: String,
    pub mode: String,
    pub rounds: Option<u32>,
    pub allow_draws: bool,
    pub draw_tolerance: f64,
    pub update_ratings: bool,
    pub seed_by_rating: bool,
    pub schedule: String,
}

impl Default for TournamentSection {
    fn default() -> Self {
        Self {
            format: "swiss".to_string(),
            mode: "by_true_strength".to_string(),
            rounds: None,
            allow_draws: false,
            draw_tolerance: DRAW_TOLERANCE,
            update_ratings: true,
            seed_by_rating: true,
            schedule: "shuffled".to_string(),
        }
    }
}

/// One `[[players]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub name: String,
    pub elo: f64,
    /// True strength; the starting Elo when absent
    #[serde(default)]
    pub strength: Option<f64>,
    #[serde(default)]
    pub strength_std_dev: Option<f64>,
    #[serde(default)]
    pub k_factor: Option<f64>,
}

impl PlayerEntry {
    pub fn to_player(&self) -> Player {
        Player {
            name: self.name.clone(),
            elo: self.elo,
            k_factor: self.k_factor.unwrap_or(DEFAULT_K_FACTOR),
            true_strength: Strength::noisy(
                self.strength.unwrap_or(self.elo),
                self.strength_std_dev.unwrap_or(0.0),
            ),
        }
    }
}

/// Command-line values that replace what the file says
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub format: Option<String>,
    pub mode: Option<String>,
    pub rounds: Option<u32>,
}

impl ExperimentConfig {
    /// Parse an experiment file.
    ///
    /// Values are only checked by [`validate`](Self::validate), so that
    /// command-line overrides get a chance to replace them first.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse TOML")
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(trials) = overrides.trials {
            self.trials = trials;
        }
        if let Some(seed) = overrides.seed {
            self.seed = seed;
        }
        if let Some(threads) = overrides.threads {
            self.threads = Some(threads);
        }
        if let Some(format) = &overrides.format {
            self.tournament.format = format.clone();
        }
        if let Some(mode) = &overrides.mode {
            self.tournament.mode = mode.clone();
        }
        if let Some(rounds) = overrides.rounds {
            self.tournament.rounds = Some(rounds);
        }
    }

    /// Everything that can be checked without running a trial
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            bail!("trials must be positive");
        }
        if self.threads == Some(0) {
            bail!("threads must be positive");
        }
        let settings = self.settings()?;
        let players = self.players();
        validate_players(&players)?;

        let min = settings.format.min_players();
        if players.len() < min {
            return Err(TournamentError::NotEnoughPlayers {
                format: settings.format,
                min,
                count: players.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Resolve the `[tournament]` table into engine settings
    pub fn settings(&self) -> Result<TournamentSettings, TournamentError> {
        let section = &self.tournament;
        let settings = TournamentSettings {
            format: section.format.parse()?,
            mode: section.mode.parse()?,
            rounds: section.rounds,
            allow_draws: section.allow_draws,
            draw_tolerance: section.draw_tolerance,
            update_ratings: section.update_ratings,
            seed_by_rating: section.seed_by_rating,
            schedule: section.schedule.parse()?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Fresh population, in file order
    pub fn players(&self) -> Vec<Player> {
        self.players.iter().map(PlayerEntry::to_player).collect()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
