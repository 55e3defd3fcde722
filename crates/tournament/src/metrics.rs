//! How closely a finishing order matches true strength

use serde::{Deserialize, Serialize};

/// Size of the podium compared by [`TrialFidelity::top_k`]
pub const TOP_K: usize = 3;

/// Fidelity of one trial's ranking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialFidelity {
    /// Spearman correlation between true strength and finishing position
    pub spearman: f64,
    /// Mean absolute distance between finishing rank and true rank
    pub mae_rank: f64,
    /// Share of the true top [`TOP_K`] found in the final top [`TOP_K`]
    pub top_k: f64,
    /// The champion is the truly strongest player
    #[serde(default)]
    pub top1: bool,
}

impl TrialFidelity {
    /// `ranks` are 1-based finishing ranks, `strengths` true strengths, both
    /// indexed by player.
    pub fn measure(ranks: &[usize], strengths: &[f64]) -> Self {
        let n = ranks.len().min(strengths.len());
        if n == 0 {
            return Self {
                spearman: 0.0,
                mae_rank: 0.0,
                top_k: 0.0,
                top1: false,
            };
        }
        let ranks = &ranks[..n];
        let strengths = &strengths[..n];

        // Better finish means a smaller rank, so correlate against -rank
        let finish: Vec<f64> = ranks.iter().map(|&r| -(r as f64)).collect();
        let spearman = spearman(strengths, &finish);

        let negated: Vec<f64> = strengths.iter().map(|s| -s).collect();
        let true_ranks = average_ranks(&negated);
        let mae_rank = ranks
            .iter()
            .zip(&true_ranks)
            .map(|(&r, t)| (r as f64 - t).abs())
            .sum::<f64>()
            / n as f64;

        let k = TOP_K.min(n);
        let mut by_strength: Vec<usize> = (0..n).collect();
        by_strength.sort_by(|&a, &b| strengths[b].total_cmp(&strengths[a]));
        // Stable sorts: among equals, the earlier roster entry comes first
        let mut by_finish: Vec<usize> = (0..n).collect();
        by_finish.sort_by_key(|&id| ranks[id]);
        let hits = by_finish[..k]
            .iter()
            .filter(|&&id| by_strength[..k].contains(&id))
            .count();

        Self {
            spearman,
            mae_rank,
            top_k: hits as f64 / k as f64,
            top1: by_finish[0] == by_strength[0],
        }
    }
}

/// 1-based ascending ranks, ties sharing the average of their positions.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start+1..=end share their mean
        let shared = (start + 1 + end) as f64 / 2.0;
        for &id in &order[start..end] {
            ranks[id] = shared;
        }
        start = end;
    }
    ranks
}

/// Spearman rank correlation. Zero when either side is constant.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    pearson(&average_ranks(x), &average_ranks(y))
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x[..n].iter().zip(&y[..n]) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x * var_y).sqrt()
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
