//! Experiment results storage and reporting

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use tourney_core::{FairnessEvent, Format, Player, ResolutionMode, TournamentOutcome};

use crate::metrics::TrialFidelity;

/// Complete results of a batch of trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResults {
    /// Name/description of the experiment
    pub name: String,
    pub format: Format,
    pub mode: ResolutionMode,
    pub seed: u64,
    /// Starting roster, in population order
    pub participants: Vec<Participant>,
    /// One record per trial, by trial index
    pub trials: Vec<TrialRecord>,
}

/// A player as they entered every trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub initial_elo: f64,
    pub true_strength: f64,
}

impl From<&Player> for Participant {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            initial_elo: player.elo,
            true_strength: player.true_strength.mean,
        }
    }
}

/// What one trial produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial: usize,
    /// Tie-groups by name, best first
    pub ranking: Vec<Vec<String>>,
    /// Finishing rank of each participant
    pub ranks: Vec<usize>,
    pub final_elo: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<FairnessEvent>,
    /// Whether the grand final went to a reset (double elimination only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bracket_reset: Option<bool>,
    pub fidelity: TrialFidelity,
}

impl TrialRecord {
    pub fn from_outcome(trial: usize, outcome: &TournamentOutcome) -> Self {
        let n = outcome.players.len();
        let ranks: Vec<usize> = outcome
            .ranking
            .ranks_by_player(n)
            .into_iter()
            .map(|rank| rank.unwrap_or(n))
            .collect();
        let strengths: Vec<f64> = outcome
            .players
            .iter()
            .map(|p| p.true_strength.mean)
            .collect();

        Self {
            trial,
            ranking: outcome.ranking.names(&outcome.players),
            fidelity: TrialFidelity::measure(&ranks, &strengths),
            ranks,
            final_elo: outcome.players.iter().map(|p| p.elo).collect(),
            events: outcome.events.clone(),
            bracket_reset: match outcome.format {
                Format::DoubleElimination => outcome.bracket.as_ref().map(|b| b.bracket_reset),
                _ => None,
            },
        }
    }

    /// Whether `participant` finished alone in first place
    pub fn won(&self, participant: usize) -> bool {
        self.ranking.first().is_some_and(|top| top.len() == 1)
            && self.ranks.get(participant) == Some(&1)
    }
}

/// Per-player statistics across all trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub true_strength: f64,
    pub initial_elo: f64,
    pub mean_rank: f64,
    /// Population standard deviation of the finishing rank
    pub std_rank: f64,
    pub mean_final_elo: f64,
    /// Trials won outright
    pub titles: usize,
}

/// Batch-level fidelity and fairness figures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FidelitySummary {
    pub mean_spearman: f64,
    pub mean_mae_rank: f64,
    pub mean_top_k: f64,
    /// Share of trials won by the truly strongest player
    pub top1_rate: f64,
    pub rematch_fallbacks: usize,
    pub truncated_searches: usize,
    pub byes_reused: usize,
    pub bracket_resets: usize,
}

impl ExperimentResults {
    pub fn new(
        name: &str,
        format: Format,
        mode: ResolutionMode,
        seed: u64,
        players: &[Player],
    ) -> Self {
        Self {
            name: name.to_string(),
            format,
            mode,
            seed,
            participants: players.iter().map(Participant::from).collect(),
            trials: Vec::new(),
        }
    }

    /// Add a trial record
    pub fn add_trial(&mut self, record: TrialRecord) {
        self.trials.push(record);
    }

    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize results")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse results in {}", path.display()))
    }

    /// Mean and spread of every participant's finishing rank
    pub fn player_summaries(&self) -> Vec<PlayerSummary> {
        let count = self.trials.len().max(1) as f64;
        self.participants
            .iter()
            .enumerate()
            .map(|(id, participant)| {
                let ranks: Vec<f64> = self
                    .trials
                    .iter()
                    .filter_map(|t| t.ranks.get(id).map(|&r| r as f64))
                    .collect();
                let mean_rank = ranks.iter().sum::<f64>() / count;
                let variance =
                    ranks.iter().map(|r| (r - mean_rank).powi(2)).sum::<f64>() / count;
                let mean_final_elo = self
                    .trials
                    .iter()
                    .filter_map(|t| t.final_elo.get(id))
                    .sum::<f64>()
                    / count;

                PlayerSummary {
                    name: participant.name.clone(),
                    true_strength: participant.true_strength,
                    initial_elo: participant.initial_elo,
                    mean_rank,
                    std_rank: variance.sqrt(),
                    mean_final_elo,
                    titles: self.trials.iter().filter(|t| t.won(id)).count(),
                }
            })
            .collect()
    }

    pub fn fidelity_summary(&self) -> FidelitySummary {
        let count = self.trials.len().max(1) as f64;
        let mean = |f: fn(&TrialFidelity) -> f64| {
            self.trials.iter().map(|t| f(&t.fidelity)).sum::<f64>() / count
        };
        let events = self.trials.iter().flat_map(|t| &t.events);

        FidelitySummary {
            mean_spearman: mean(|f| f.spearman),
            mean_mae_rank: mean(|f| f.mae_rank),
            mean_top_k: mean(|f| f.top_k),
            top1_rate: mean(|f| if f.top1 { 1.0 } else { 0.0 }),
            rematch_fallbacks: events
                .clone()
                .filter(|e| matches!(e, FairnessEvent::RematchFallback { .. }))
                .count(),
            truncated_searches: events
                .clone()
                .filter(|e| matches!(e, FairnessEvent::SearchTruncated { .. }))
                .count(),
            byes_reused: events
                .filter(|e| matches!(e, FairnessEvent::ByeReused { .. }))
                .count(),
            bracket_resets: self
                .trials
                .iter()
                .filter(|t| t.bracket_reset == Some(true))
                .count(),
        }
    }

    /// Generate a text report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("=== Experiment: {} ===\n\n", self.name));
        report.push_str(&format!(
            "Format: {}, mode: {}, {} trials, seed {}\n\n",
            self.format,
            self.mode,
            self.trials.len(),
            self.seed
        ));

        let fidelity = self.fidelity_summary();
        report.push_str(&format!(
            "Spearman {:.3}  rank MAE {:.2}  top-3 {:.1}%  top-1 {:.1}%\n",
            fidelity.mean_spearman,
            fidelity.mean_mae_rank,
            fidelity.mean_top_k * 100.0,
            fidelity.top1_rate * 100.0
        ));
        report.push_str(&format!(
            "Rematch fallbacks {}  truncated searches {}  reused byes {}  bracket resets {}\n\n",
            fidelity.rematch_fallbacks,
            fidelity.truncated_searches,
            fidelity.byes_reused,
            fidelity.bracket_resets
        ));

        report.push_str(&format!(
            "{:<24} {:>8} {:>8} {:>9} {:>7} {:>9} {:>6}\n",
            "Player", "Strength", "Elo", "Mean rk", "Std", "Final elo", "Wins"
        ));
        report.push_str(&"-".repeat(77));
        report.push('\n');

        let mut summaries = self.player_summaries();
        summaries.sort_by(|a, b| b.true_strength.total_cmp(&a.true_strength));
        for s in &summaries {
            report.push_str(&format!(
                "{:<24} {:>8.0} {:>8.0} {:>9.2} {:>7.2} {:>9.1} {:>6}\n",
                s.name,
                s.true_strength,
                s.initial_elo,
                s.mean_rank,
                s.std_rank,
                s.mean_final_elo,
                s.titles
            ));
        }

        report
    }

    /// Print report to stdout
    pub fn print_report(&self) {
        println!("{}", self.generate_report());
    }
}

#[cfg(test)]
#[path = "results_tests.rs"]
mod results_tests;
