//! Elo rating calculation

use crate::types::{MatchOutcome, Player};

/// Rating gap at which the stronger player is a 10:1 favourite
pub const ELO_SCALE: f64 = 400.0;

/// Expected score of a player rated `rating_a` against one rated `rating_b`.
///
/// Always within [0, 1] for finite inputs; extreme gaps saturate instead of
/// producing NaN.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf(-(rating_a - rating_b) / ELO_SCALE))
}

/// Move a player's rating towards an observed result.
///
/// `actual_score` is 1 for a win, 0.5 for a draw and 0 for a loss.
pub fn apply_update(player: &mut Player, expected: f64, actual_score: f64) {
    player.elo += player.k_factor * (actual_score - expected);
}

/// Update both players of a finished match, each with their own expectation
/// and K-factor.
pub fn update_ratings(first: &mut Player, second: &mut Player, outcome: MatchOutcome) {
    let expected_first = expected_score(first.elo, second.elo);
    let expected_second = 1.0 - expected_first;

    apply_update(first, expected_first, outcome.first_score());
    apply_update(second, expected_second, outcome.second_score());
}

#[cfg(test)]
#[path = "rating_tests.rs"]
mod rating_tests;
