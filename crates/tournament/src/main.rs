//! Tournament CLI
//!
//! Replay a roster through a tournament format many times and report how
//! faithfully the format ranks players.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use tournament::{run_experiment, run_trial, ConfigOverrides, ExperimentConfig, ExperimentResults};

#[derive(Debug, Parser)]
#[command(name = "tournament", version)]
#[command(about = "Monte Carlo comparison of tournament formats")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every trial of an experiment and print the report
    Run {
        /// Experiment file (TOML)
        config: PathBuf,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Write results as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Play one trial and print its final ranking
    Single {
        /// Experiment file (TOML)
        config: PathBuf,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Trial index (selects the RNG stream)
        #[arg(long, default_value_t = 0)]
        trial: usize,
    },
    /// Print the report of saved results
    Report {
        /// Results file (JSON)
        results: PathBuf,
    },
}

#[derive(Debug, Args)]
struct OverrideArgs {
    /// Number of trials
    #[arg(long)]
    trials: Option<usize>,

    /// Experiment seed
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads
    #[arg(long)]
    threads: Option<usize>,

    /// swiss, round_robin, double_elimination or single_elimination
    #[arg(long)]
    format: Option<String>,

    /// by_true_strength, by_current_rating or deterministic
    #[arg(long)]
    mode: Option<String>,

    /// Swiss rounds
    #[arg(long)]
    rounds: Option<u32>,
}

impl From<OverrideArgs> for ConfigOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            trials: args.trials,
            seed: args.seed,
            threads: args.threads,
            format: args.format,
            mode: args.mode,
            rounds: args.rounds,
        }
    }
}

fn load_config(path: &Path, overrides: OverrideArgs) -> Result<ExperimentConfig> {
    let mut config = ExperimentConfig::load(path)?;
    config.apply_overrides(&overrides.into());
    config.validate()?;
    Ok(config)
}

fn run(config: PathBuf, overrides: OverrideArgs, output: Option<PathBuf>) -> Result<()> {
    let config = load_config(&config, overrides)?;
    let results = run_experiment(&config)?;
    results.print_report();

    if let Some(path) = output {
        results.save(&path)?;
        info!("results written to {}", path.display());
    }
    Ok(())
}

fn single(config: PathBuf, overrides: OverrideArgs, trial: usize) -> Result<()> {
    let config = load_config(&config, overrides)?;
    let settings = config.settings()?;
    let outcome = run_trial(&config.players(), &settings, config.seed, trial)?;

    println!(
        "=== {} / trial {}: {} ({}) ===",
        config.name, trial, settings.format, settings.mode
    );
    for (group, names) in outcome
        .ranking
        .groups()
        .iter()
        .zip(outcome.ranking.names(&outcome.players))
    {
        let elos: Vec<String> = group
            .players
            .iter()
            .map(|&id| format!("{:.0}", outcome.players[id].elo))
            .collect();
        println!(
            "{:>3}. {} ({})",
            group.rank,
            names.join(", "),
            elos.join(", ")
        );
    }
    for event in &outcome.events {
        println!("note: {event:?}");
    }
    if let Some(bracket) = &outcome.bracket {
        println!(
            "{} matches over {} rounds{}",
            bracket.matches_played,
            bracket.rounds,
            if bracket.bracket_reset {
                ", bracket reset"
            } else {
                ""
            }
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            overrides,
            output,
        } => run(config, overrides, output),
        Command::Single {
            config,
            overrides,
            trial,
        } => single(config, overrides, trial),
        Command::Report { results } => {
            ExperimentResults::load(&results)?.print_report();
            Ok(())
        }
    }
}
