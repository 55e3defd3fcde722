use super::*;

fn field(elos: &[f64]) -> Vec<Player> {
    elos.iter()
        .enumerate()
        .map(|(i, &elo)| Player::rated(format!("p{i}"), elo))
        .collect()
}

#[test]
fn test_standings_sort_by_score_then_rating() {
    let players = field(&[1500.0, 1600.0, 1400.0, 1700.0]);
    let scores = [2.0, 1.0, 2.0, 1.0];
    assert_eq!(standings_order(&players, &scores), vec![0, 2, 3, 1]);
}

#[test]
fn test_exact_ties_keep_population_order() {
    let players = field(&[1500.0, 1500.0, 1500.0]);
    let scores = [1.0, 1.0, 1.0];
    assert_eq!(standings_order(&players, &scores), vec![0, 1, 2]);
}

#[test]
fn test_rank_numbers_skip_by_group_size() {
    let ranking = RankingResult::from_groups(vec![vec![4], vec![2], vec![0, 3], vec![1, 5, 6], vec![7]]);
    let ranks: Vec<usize> = ranking.groups().iter().map(|g| g.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 5, 8]);
    assert_eq!(ranking.player_count(), 8);
    assert!(ranking.is_partition_of(8));
}

#[test]
fn test_empty_groups_are_dropped() {
    let ranking = RankingResult::from_groups(vec![vec![1], vec![], vec![0]]);
    assert_eq!(ranking.groups().len(), 2);
    assert_eq!(ranking.rank_of(0), Some(2));
}

#[test]
fn test_equal_score_different_rating_not_tied() {
    let players = field(&[1500.0, 1550.0, 1500.0]);
    let scores = [3.0, 3.0, 3.0];
    let ranking = RankingResult::by_standings(&players, &scores);

    assert_eq!(
        ranking.groups(),
        &[
            TieGroup { rank: 1, players: vec![1] },
            TieGroup { rank: 2, players: vec![0, 2] },
        ]
    );
}

#[test]
fn test_by_standings_full_order() {
    let players = field(&[1500.0, 1600.0, 1400.0, 1300.0]);
    let scores = [1.0, 0.0, 3.0, 1.0];
    let ranking = RankingResult::by_standings(&players, &scores);

    assert_eq!(ranking.flatten(), vec![2, 0, 3, 1]);
    assert_eq!(ranking.champion(), Some(2));
    assert_eq!(ranking.rank_of(1), Some(4));
}

#[test]
fn test_partition_check_catches_duplicates_and_gaps() {
    assert!(!RankingResult::from_groups(vec![vec![0], vec![0, 1]]).is_partition_of(2));
    assert!(!RankingResult::from_groups(vec![vec![0]]).is_partition_of(2));
    assert!(!RankingResult::from_groups(vec![vec![0], vec![5]]).is_partition_of(2));
}

#[test]
fn test_shared_first_place_has_no_champion() {
    let ranking = RankingResult::from_groups(vec![vec![0, 1], vec![2]]);
    assert_eq!(ranking.champion(), None);
    assert_eq!(ranking.ranks_by_player(4), vec![Some(1), Some(1), Some(3), None]);
}

#[test]
fn test_names_follow_groups() {
    let players = field(&[1500.0, 1400.0, 1300.0]);
    let ranking = RankingResult::from_groups(vec![vec![2], vec![0, 1]]);
    assert_eq!(
        ranking.names(&players),
        vec![vec!["p2".to_string()], vec!["p0".to_string(), "p1".to_string()]]
    );
}
