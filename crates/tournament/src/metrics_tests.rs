use super::*;
use proptest::prelude::*;

#[test]
fn test_average_ranks_share_ties() {
    assert_eq!(average_ranks(&[10.0, 30.0, 20.0]), vec![1.0, 3.0, 2.0]);
    assert_eq!(average_ranks(&[5.0, 5.0, 1.0, 5.0]), vec![3.0, 3.0, 1.0, 3.0]);
    assert!(average_ranks(&[]).is_empty());
}

#[test]
fn test_spearman_extremes() {
    let x = [1.0, 2.0, 3.0, 4.0];
    assert!((spearman(&x, &[10.0, 20.0, 30.0, 40.0]) - 1.0).abs() < 1e-12);
    assert!((spearman(&x, &[4.0, 3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
    assert_eq!(spearman(&x, &[7.0; 4]), 0.0);
    assert_eq!(spearman(&[1.0], &[2.0]), 0.0);
}

#[test]
fn test_perfect_ranking() {
    let strengths = [1800.0, 1500.0, 1700.0, 1600.0];
    let ranks = [1, 4, 2, 3];
    let fidelity = TrialFidelity::measure(&ranks, &strengths);

    assert!((fidelity.spearman - 1.0).abs() < 1e-12);
    assert_eq!(fidelity.mae_rank, 0.0);
    assert_eq!(fidelity.top_k, 1.0);
    assert!(fidelity.top1);
}

#[test]
fn test_reversed_ranking() {
    let strengths = [1800.0, 1700.0, 1600.0, 1500.0];
    let ranks = [4, 3, 2, 1];
    let fidelity = TrialFidelity::measure(&ranks, &strengths);

    assert!((fidelity.spearman + 1.0).abs() < 1e-12);
    // |4-1| + |3-2| + |2-3| + |1-4|
    assert_eq!(fidelity.mae_rank, 2.0);
    // Players 1 and 2 make both top threes
    assert!((fidelity.top_k - 2.0 / 3.0).abs() < 1e-12);
    assert!(!fidelity.top1);
}

#[test]
fn test_top1_needs_the_strongest_champion() {
    // Podium is right as a set, but the order at the top is swapped
    let strengths = [1800.0, 1700.0, 1600.0, 1500.0];
    let fidelity = TrialFidelity::measure(&[2, 1, 3, 4], &strengths);
    assert_eq!(fidelity.top_k, 1.0);
    assert!(!fidelity.top1);
}

#[test]
fn test_tied_finish() {
    let strengths = [1600.0, 1500.0];
    let fidelity = TrialFidelity::measure(&[1, 1], &strengths);
    assert_eq!(fidelity.spearman, 0.0);
    assert_eq!(fidelity.mae_rank, 0.5);
    assert_eq!(fidelity.top_k, 1.0);
}

#[test]
fn test_empty_field() {
    let fidelity = TrialFidelity::measure(&[], &[]);
    assert_eq!(fidelity.mae_rank, 0.0);
    assert_eq!(fidelity.top_k, 0.0);
    assert!(!fidelity.top1);
}

proptest! {
    #[test]
    fn test_average_ranks_sum_is_fixed(values in prop::collection::vec(0u8..6, 0..30)) {
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        let ranks = average_ranks(&values);
        let n = values.len() as f64;
        // Ties share a mean, so the total is always 1 + 2 + ... + n
        prop_assert!((ranks.iter().sum::<f64>() - n * (n + 1.0) / 2.0).abs() < 1e-9);
        for (i, j) in (0..values.len()).flat_map(|i| (0..values.len()).map(move |j| (i, j))) {
            if values[i] < values[j] {
                prop_assert!(ranks[i] < ranks[j]);
            } else if values[i] == values[j] {
                prop_assert_eq!(ranks[i], ranks[j]);
            }
        }
    }

    #[test]
    fn test_spearman_bounded_and_symmetric(
        pairs in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 2..25),
    ) {
        let (x, y): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let rho = spearman(&x, &y);
        prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&rho));
        prop_assert!((rho - spearman(&y, &x)).abs() < 1e-9);
        prop_assert!((spearman(&x, &x) - 1.0).abs() < 1e-9 || x.iter().all(|&v| v == x[0]));
    }

    #[test]
    fn test_spearman_follows_rank_order(
        values in prop::collection::vec(-100.0f64..100.0, 2..25),
    ) {
        let reference: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
        let rho = spearman(&values, &reference);
        let scaled: Vec<f64> = values.iter().map(|v| v * 4.0).collect();
        let negated: Vec<f64> = values.iter().map(|v| -v).collect();
        prop_assert!((spearman(&scaled, &reference) - rho).abs() < 1e-9);
        prop_assert!((spearman(&negated, &reference) + rho).abs() < 1e-9);
    }
}
