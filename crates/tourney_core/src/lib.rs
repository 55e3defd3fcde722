//! Tournament engine for format-fidelity experiments
//!
//! This crate provides:
//! - An Elo rating model and a stochastic match resolver
//! - Swiss, round-robin and elimination-bracket pairing
//! - A controller that plays Swiss and round-robin events to a ranking
//! - Double- and single-elimination bracket engines
//!
//! # Usage
//!
//! ```no_run
//! use rand::SeedableRng;
//! use tourney_core::{simulate, Format, Player, TournamentSettings};
//!
//! let players = vec![Player::rated("ana", 1600.0), Player::rated("bob", 1500.0)];
//! let settings = TournamentSettings { format: Format::RoundRobin, ..Default::default() };
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let outcome = simulate(players, &settings, &mut rng).unwrap();
//! println!("{:?}", outcome.ranking.names(&outcome.players));
//! ```

pub mod bracket;
pub mod controller;
pub mod error;
pub mod pairing;
pub mod ranking;
pub mod rating;
pub mod resolver;
pub mod simulation;
pub mod types;

pub use bracket::*;
pub use controller::*;
pub use error::TournamentError;
pub use pairing::*;
pub use ranking::*;
pub use rating::*;
pub use resolver::*;
pub use simulation::*;
pub use types::*;
