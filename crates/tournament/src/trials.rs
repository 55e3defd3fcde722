//! Parallel Monte Carlo trials
//!
//! Each trial gets a deep copy of the roster and its own `ChaCha8Rng`, seeded
//! from the experiment seed with the trial index as stream. Results depend
//! only on (seed, trial index), never on thread count or scheduling.

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use tourney_core::{simulate, Player, TournamentError, TournamentOutcome, TournamentSettings};

use crate::config::ExperimentConfig;
use crate::results::{ExperimentResults, TrialRecord};

/// Log a progress line every this many finished trials
const PROGRESS_EVERY: usize = 100;

/// Deterministic RNG for one trial
pub fn trial_rng(seed: u64, trial: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial as u64);
    rng
}

/// Run a single trial on a fresh copy of `roster`.
pub fn run_trial(
    roster: &[Player],
    settings: &TournamentSettings,
    seed: u64,
    trial: usize,
) -> Result<TournamentOutcome, TournamentError> {
    let mut rng = trial_rng(seed, trial);
    simulate(roster.to_vec(), settings, &mut rng)
}

/// Run every trial of an experiment and collect the records.
pub fn run_experiment(config: &ExperimentConfig) -> Result<ExperimentResults> {
    config.validate()?;
    let settings = config.settings()?;
    let roster = config.players();

    let pool = {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = config.threads {
            builder = builder.num_threads(threads);
        }
        builder.build().context("failed to create rayon thread pool")?
    };

    info!(
        "{}: {} trials of {} ({}) with {} players on {} threads",
        config.name,
        config.trials,
        settings.format,
        settings.mode,
        roster.len(),
        pool.current_num_threads()
    );

    let start = Instant::now();
    let completed = AtomicUsize::new(0);
    let records: Mutex<BTreeMap<usize, TrialRecord>> = Mutex::new(BTreeMap::new());

    pool.install(|| {
        (0..config.trials).into_par_iter().try_for_each(|trial| -> Result<()> {
            let outcome = run_trial(&roster, &settings, config.seed, trial)
                .with_context(|| format!("trial {trial} failed"))?;
            let record = TrialRecord::from_outcome(trial, &outcome);
            debug!(
                "trial {trial}: winner {:?}, spearman {:.3}",
                record.ranking.first(),
                record.fidelity.spearman
            );

            records
                .lock()
                .map_err(|_| anyhow!("trial results lock poisoned"))?
                .insert(trial, record);

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % PROGRESS_EVERY == 0 {
                info!("{done}/{} trials done", config.trials);
            }
            Ok(())
        })
    })?;

    let records = records
        .into_inner()
        .map_err(|_| anyhow!("trial results lock poisoned"))?;

    let mut results = ExperimentResults::new(
        &config.name,
        settings.format,
        settings.mode,
        config.seed,
        &roster,
    );
    for record in records.into_values() {
        results.add_trial(record);
    }

    info!(
        "{}: {} trials in {:.2?}",
        config.name,
        results.trials.len(),
        start.elapsed()
    );
    Ok(results)
}

#[cfg(test)]
#[path = "trials_tests.rs"]
mod trials_tests;
