//! Property-based tests for pairing, brackets and rankings
//!
//! Each case builds its own seeded RNG so failures shrink and replay.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tourney_core::{
    expected_score, simulate, DoubleElimination, Format, MatchResolver, Player, RankingResult,
    ResolutionMode, ResolverConfig, ScheduleOrder, TournamentController, TournamentSettings,
};

fn population(elos: &[f64]) -> Vec<Player> {
    elos.iter()
        .enumerate()
        .map(|(i, &elo)| Player::rated(format!("p{i}"), elo))
        .collect()
}

// Distinct strengths in arbitrary population order
fn distinct_strengths(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::btree_set(0u32..5000, min..=max)
        .prop_map(|set| set.into_iter().map(|s| 1000.0 + s as f64).collect::<Vec<_>>())
        .prop_shuffle()
}

fn any_elos(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1000.0f64..2200.0, min..=max)
}

proptest! {
    #[test]
    fn test_expected_score_symmetric(a in -2000.0f64..4000.0, b in -2000.0f64..4000.0) {
        let ab = expected_score(a, b);
        let ba = expected_score(b, a);
        prop_assert!(ab > 0.0 && ab < 1.0);
        prop_assert!((ab + ba - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_swiss_rounds_partition_the_field(
        elos in any_elos(1, 15),
        rounds in 1u32..7,
        seed in any::<u64>(),
    ) {
        let n = elos.len();
        let resolver = MatchResolver::with_mode(ResolutionMode::ByTrueStrength);
        let mut controller = TournamentController::new(population(&elos), resolver).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let ranking = controller.run_swiss(rounds, &mut rng).unwrap();

        let mut byes_so_far = vec![0u32; n];
        for set in controller.rounds() {
            let mut seen = set.participants();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());

            for bye in set.byes() {
                // A second bye only once nobody is left without one
                if byes_so_far[bye] > 0 {
                    prop_assert!(set.bye_reused);
                }
                byes_so_far[bye] += 1;
            }
        }
        prop_assert!(ranking.is_partition_of(n));
    }

    #[test]
    fn test_swiss_never_rematches_without_flag(
        elos in any_elos(2, 12),
        rounds in 1u32..6,
        seed in any::<u64>(),
    ) {
        let resolver = MatchResolver::with_mode(ResolutionMode::ByCurrentRating);
        let mut controller = TournamentController::new(population(&elos), resolver).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        controller.run_swiss(rounds, &mut rng).unwrap();

        let mut met = std::collections::HashSet::new();
        for set in controller.rounds() {
            for (a, b) in set.matches() {
                let fresh = met.insert((a.min(b), a.max(b)));
                prop_assert!(fresh || set.rematch_fallback);
            }
        }
    }

    #[test]
    fn test_double_elimination_loss_counts(
        elos in any_elos(3, 20),
        seed_by_rating in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let n = elos.len();
        let mut players = population(&elos);
        let resolver = MatchResolver::with_mode(ResolutionMode::ByTrueStrength);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let outcome = DoubleElimination::new(&players, seed_by_rating, &mut rng)
            .unwrap()
            .run(&mut players, &resolver, &mut rng);

        prop_assert!(outcome.ranking.is_partition_of(n));
        prop_assert_eq!(outcome.ranking.champion(), Some(outcome.champion));
        prop_assert_eq!(outcome.losses[outcome.champion], u32::from(outcome.bracket_reset));
        for (id, &losses) in outcome.losses.iter().enumerate() {
            if id != outcome.champion {
                prop_assert_eq!(losses, 2);
            }
        }
        prop_assert_eq!(outcome.losses.iter().sum::<u32>() as usize, outcome.matches_played);
    }

    #[test]
    fn test_rank_numbers_skip_by_group_size(
        sizes in prop::collection::vec(0usize..4, 0..10),
    ) {
        let mut next = 0;
        let groups: Vec<Vec<usize>> = sizes
            .iter()
            .map(|&size| {
                let group = (next..next + size).collect();
                next += size;
                group
            })
            .collect();
        let ranking = RankingResult::from_groups(groups);

        prop_assert!(ranking.is_partition_of(next));
        let mut expected_rank = 1;
        for group in ranking.groups() {
            prop_assert!(!group.players.is_empty());
            prop_assert_eq!(group.rank, expected_rank);
            expected_rank += group.players.len();
        }
    }

    #[test]
    fn test_deterministic_round_robin_recovers_strength_order(
        strengths in distinct_strengths(2, 12),
        seed in any::<u64>(),
    ) {
        let players = population(&strengths);
        let settings = TournamentSettings {
            format: Format::RoundRobin,
            mode: ResolutionMode::DeterministicByStrength,
            schedule: ScheduleOrder::Shuffled,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let outcome = simulate(players, &settings, &mut rng).unwrap();

        let mut by_strength: Vec<usize> = (0..strengths.len()).collect();
        by_strength.sort_by(|&a, &b| strengths[b].total_cmp(&strengths[a]));
        prop_assert_eq!(outcome.ranking.flatten(), by_strength);
        prop_assert!(outcome.ranking.groups().iter().all(|g| g.players.len() == 1));
    }

    #[test]
    fn test_every_format_is_reproducible(
        elos in any_elos(2, 10),
        format_idx in 0usize..4,
        seed in any::<u64>(),
    ) {
        let format = [
            Format::Swiss,
            Format::RoundRobin,
            Format::DoubleElimination,
            Format::SingleElimination,
        ][format_idx];
        let settings = TournamentSettings {
            format,
            allow_draws: true,
            ..Default::default()
        };
        let run = || {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            simulate(population(&elos), &settings, &mut rng).unwrap()
        };
        let first = run();
        prop_assert!(first.ranking.is_partition_of(elos.len()));
        prop_assert_eq!(first, run());
    }
}

#[test]
fn test_draw_band_config_accepted_at_bounds() {
    for tolerance in [0.0, 0.5] {
        let config = ResolverConfig {
            draw_tolerance: tolerance,
            ..Default::default()
        };
        assert!(MatchResolver::new(config).is_ok());
    }
}
