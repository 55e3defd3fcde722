//! Error taxonomy for tournament construction.
//!
//! Only configuration problems and bracket underpopulation are errors. Pairing
//! deadlocks are resolved in-engine and reported as [`FairnessEvent`]s.
//!
//! [`FairnessEvent`]: crate::FairnessEvent

use thiserror::Error;

use crate::types::Format;

/// Errors raised before any simulation state is created.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TournamentError {
    #[error("unknown tournament format `{0}` (expected swiss, round_robin, double_elimination or single_elimination)")]
    UnknownFormat(String),
    #[error("unknown resolution mode `{0}` (expected by_true_strength, by_current_rating or deterministic)")]
    UnknownMode(String),
    #[error("unknown schedule order `{0}` (expected canonical or shuffled)")]
    UnknownSchedule(String),
    #[error("player set is empty")]
    NoPlayers,
    #[error("round count must be positive (got {0})")]
    InvalidRoundCount(u32),
    #[error("{format} needs at least {min} players (got {count})")]
    NotEnoughPlayers {
        format: Format,
        min: usize,
        count: usize,
    },
    #[error("duplicate player name `{0}`")]
    DuplicateName(String),
    #[error("player `{name}`: {field} must be finite (got {value})")]
    NonFinite {
        name: String,
        field: &'static str,
        value: f64,
    },
    #[error("player `{name}`: {field} must not be negative (got {value})")]
    Negative {
        name: String,
        field: &'static str,
        value: f64,
    },
    #[error("draw tolerance must be within [0, 0.5] (got {0})")]
    InvalidDrawTolerance(f64),
}
