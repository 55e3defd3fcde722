use super::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn field(n: usize) -> Vec<Player> {
    (0..n)
        .map(|i| Player::rated(format!("p{i}"), 1800.0 - 50.0 * i as f64))
        .collect()
}

fn settings(format: Format) -> TournamentSettings {
    TournamentSettings {
        format,
        ..Default::default()
    }
}

#[test]
fn test_default_swiss_rounds() {
    assert_eq!(default_swiss_rounds(0), 1);
    assert_eq!(default_swiss_rounds(1), 1);
    assert_eq!(default_swiss_rounds(2), 1);
    assert_eq!(default_swiss_rounds(5), 3);
    assert_eq!(default_swiss_rounds(8), 3);
    assert_eq!(default_swiss_rounds(21), 5);
}

#[test]
fn test_configuration_errors_fail_fast() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let zero_rounds = TournamentSettings {
        rounds: Some(0),
        ..Default::default()
    };
    assert_eq!(
        simulate(field(4), &zero_rounds, &mut rng).unwrap_err(),
        TournamentError::InvalidRoundCount(0)
    );

    let wide_band = TournamentSettings {
        draw_tolerance: 0.7,
        ..Default::default()
    };
    assert_eq!(
        simulate(field(4), &wide_band, &mut rng).unwrap_err(),
        TournamentError::InvalidDrawTolerance(0.7)
    );

    assert_eq!(
        simulate(Vec::new(), &settings(Format::RoundRobin), &mut rng).unwrap_err(),
        TournamentError::NoPlayers
    );

    let mut bad = field(3);
    bad[1].elo = f64::NAN;
    assert!(matches!(
        simulate(bad, &settings(Format::Swiss), &mut rng),
        Err(TournamentError::NonFinite { field: "elo", .. })
    ));
}

#[test]
fn test_bracket_needs_two_players() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for format in [Format::DoubleElimination, Format::SingleElimination] {
        assert!(matches!(
            simulate(field(1), &settings(format), &mut rng),
            Err(TournamentError::NotEnoughPlayers { min: 2, count: 1, .. })
        ));
    }
}

#[test]
fn test_every_format_ranks_everyone() {
    for format in [
        Format::Swiss,
        Format::RoundRobin,
        Format::DoubleElimination,
        Format::SingleElimination,
    ] {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let outcome = simulate(field(9), &settings(format), &mut rng).unwrap();
        assert_eq!(outcome.format, format);
        assert!(outcome.ranking.is_partition_of(9), "{format}");
        assert_eq!(outcome.players.len(), 9);
        assert_eq!(outcome.bracket.is_some(), format.min_players() == 2);
    }
}

#[test]
fn test_swiss_snapshots_cover_default_rounds() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let outcome = simulate(field(8), &settings(Format::Swiss), &mut rng).unwrap();
    assert_eq!(outcome.snapshots.len(), 8 * 3);
    assert_eq!(outcome.snapshots.last().map(|s| s.round), Some(3));
}

#[test]
fn test_same_seed_same_outcome() {
    let run = |seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        simulate(field(10), &settings(Format::DoubleElimination), &mut rng).unwrap()
    };
    assert_eq!(run(7), run(7));
}

#[test]
fn test_frozen_ratings_leave_players_untouched() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let frozen = TournamentSettings {
        format: Format::RoundRobin,
        update_ratings: false,
        ..Default::default()
    };
    let outcome = simulate(field(6), &frozen, &mut rng).unwrap();
    assert_eq!(outcome.players, field(6));
}
