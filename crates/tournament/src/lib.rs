//! Experiment driver for tournament-format fidelity
//!
//! This crate provides infrastructure for:
//! - Loading experiment files (roster + tournament settings) from TOML
//! - Running many seeded trials in parallel
//! - Measuring how well each ranking recovers true strength
//! - Saving results as JSON and printing a per-player report
//!
//! # Usage
//!
//! ```bash
//! # Run the bundled Belloy roster as a 5-round Swiss, 1000 times
//! cargo run -p tournament -- run configs/belloy.toml --trials 1000 --rounds 5
//!
//! # Same roster, double elimination, results to disk
//! cargo run -p tournament -- run configs/belloy.toml --format double --output belloy.json
//!
//! # Re-print a saved report
//! cargo run -p tournament -- report belloy.json
//! ```

mod config;
mod metrics;
mod results;
mod trials;

pub use config::*;
pub use metrics::*;
pub use results::*;
pub use trials::*;
