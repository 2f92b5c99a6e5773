//! Aggregation and scoring engine.
//!
//! Turns flat per-bracket observation rows into a ranked brawler table:
//! 1. Group rows by brawler, summing picks and implied wins
//! 2. Derive win-rate and pick-rate percentages
//! 3. Trim the least-picked brawlers
//! 4. Score each survivor against the field-average win rate
//! 5. Filter, sort, round for presentation
//!
//! The engine is a pure function over its input; it does no I/O and holds
//! no state between calls.

use std::cmp::Ordering;
use std::collections::HashMap;

use thiserror::Error;

use crate::models::{RankedBrawler, Ranking, RawObservation};

/// Brawlers scoring below this are dropped from the final table.
pub const MIN_SCORE: f64 = 5.0;

/// Errors from the ranking computation.
#[derive(Debug, Error)]
pub enum RankError {
    #[error("no data available")]
    NoData,
}

/// Per-brawler totals after grouping, before trimming and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct BrawlerTotals {
    pub brawler: String,
    pub total_picks: f64,
    pub total_wins: f64,
    pub win_rate_pct: f64,
    pub pick_rate_pct: f64,
}

/// Group observations by brawler and derive rate percentages.
///
/// `total_wins` is the implied win count `Σ picks · win_rate`. The result is
/// ordered by pick rate descending, ties broken by brawler name ascending,
/// so downstream trimming is deterministic.
pub fn aggregate(observations: &[RawObservation]) -> Vec<BrawlerTotals> {
    let mut sums: HashMap<&str, (f64, f64)> = HashMap::new();
    for obs in observations {
        let entry = sums.entry(obs.brawler.as_str()).or_insert((0.0, 0.0));
        entry.0 += obs.picks;
        entry.1 += obs.picks * obs.win_rate;
    }

    let total_picks_overall: f64 = sums.values().map(|(picks, _)| picks).sum();

    let mut totals: Vec<BrawlerTotals> = sums
        .into_iter()
        .map(|(brawler, (total_picks, total_wins))| BrawlerTotals {
            brawler: brawler.to_string(),
            total_picks,
            total_wins,
            win_rate_pct: total_wins / total_picks * 100.0,
            pick_rate_pct: total_picks / total_picks_overall * 100.0,
        })
        .collect();

    totals.sort_by(|a, b| {
        b.pick_rate_pct
            .partial_cmp(&a.pick_rate_pct)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.brawler.cmp(&b.brawler))
    });

    totals
}

/// Drop the `n` lowest-pick-rate brawlers.
///
/// Expects input ordered as produced by [`aggregate`]. `n` at or above the
/// brawler count yields an empty vec.
pub fn trim_least_picked(mut totals: Vec<BrawlerTotals>, n: usize) -> Vec<BrawlerTotals> {
    let keep = totals.len().saturating_sub(n);
    totals.truncate(keep);
    totals
}

/// Rank brawlers by composite score.
///
/// Outperforming the retained-field average win rate is rewarded at twice
/// the slope underperformance is penalized, then scaled by `ln(1 + pick
/// rate)` so low-sample brawlers do not dominate on volatility alone.
///
/// Empty input is an error ([`RankError::NoData`]); removing every brawler
/// is not, and returns an empty ranking.
pub fn rank(
    observations: &[RawObservation],
    brawlers_to_remove: usize,
) -> Result<Ranking, RankError> {
    if observations.is_empty() {
        return Err(RankError::NoData);
    }

    let totals = aggregate(observations);
    let retained = trim_least_picked(totals, brawlers_to_remove);

    if retained.is_empty() {
        return Ok(Ranking {
            avg_win_rate: 0.0,
            rows: Vec::new(),
        });
    }

    // Baseline is established over the post-trim set: low-sample brawlers
    // are removed before the average so they cannot skew it.
    let avg_win_rate =
        retained.iter().map(|t| t.win_rate_pct).sum::<f64>() / retained.len() as f64;

    let mut rows: Vec<RankedBrawler> = retained
        .into_iter()
        .map(|t| {
            let diff = t.win_rate_pct - avg_win_rate;
            let adjusted = if diff > 0.0 { 2.0 * diff } else { diff };
            let score = adjusted * (1.0 + t.pick_rate_pct).ln();
            RankedBrawler {
                brawler: t.brawler,
                win_rate_pct: t.win_rate_pct,
                pick_rate_pct: t.pick_rate_pct,
                score,
            }
        })
        .filter(|r| r.score >= MIN_SCORE)
        .collect();

    rows.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.brawler.cmp(&b.brawler))
    });

    for row in &mut rows {
        row.win_rate_pct = round2(row.win_rate_pct);
        row.pick_rate_pct = round2(row.pick_rate_pct);
        row.score = round2(row.score);
    }

    Ok(Ranking { avg_win_rate, rows })
}

/// Round to two decimal places for presentation.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn obs(brawler: &str, picks: f64, win_rate: f64) -> RawObservation {
        RawObservation::new(brawler, picks, win_rate)
    }

    /// Two-brawler worked example with hand-calculated expectations.
    ///
    /// A: picks 100/200/50 at win rates 0.5/0.6/0.4 → 350 picks, 190 wins,
    /// 54.2857% win rate, 70% pick rate.
    /// B: 150 picks at 0.3 → 45 wins, 30% win rate, 30% pick rate.
    /// avg = 42.142857; A scores 2·12.142857·ln(71) ≈ 103.52, B scores
    /// -12.142857·ln(31) ≈ -41.70 and is filtered out.
    #[test]
    fn test_rank_worked_example() {
        let observations = vec![
            obs("A", 100.0, 0.5),
            obs("A", 200.0, 0.6),
            obs("A", 50.0, 0.4),
            obs("B", 150.0, 0.3),
        ];

        let ranking = rank(&observations, 0).unwrap();

        assert!((ranking.avg_win_rate - 42.142857142857).abs() < EPSILON);
        assert_eq!(ranking.rows.len(), 1);

        let a = &ranking.rows[0];
        assert_eq!(a.brawler, "A");
        assert!((a.win_rate_pct - 54.29).abs() < 1e-9);
        assert!((a.pick_rate_pct - 70.0).abs() < 1e-9);
        assert!((a.score - 103.52).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_totals() {
        let observations = vec![
            obs("A", 100.0, 0.5),
            obs("A", 200.0, 0.6),
            obs("A", 50.0, 0.4),
            obs("B", 150.0, 0.3),
        ];

        let totals = aggregate(&observations);
        assert_eq!(totals.len(), 2);

        let a = totals.iter().find(|t| t.brawler == "A").unwrap();
        assert!((a.total_picks - 350.0).abs() < EPSILON);
        assert!((a.total_wins - 190.0).abs() < EPSILON);
        assert!((a.win_rate_pct - 54.285714285714).abs() < EPSILON);

        let b = totals.iter().find(|t| t.brawler == "B").unwrap();
        assert!((b.total_picks - 150.0).abs() < EPSILON);
        assert!((b.total_wins - 45.0).abs() < EPSILON);
        assert!((b.win_rate_pct - 30.0).abs() < EPSILON);
    }

    #[test]
    fn test_pick_rates_sum_to_100_pre_trim() {
        let observations = vec![
            obs("A", 120.0, 0.55),
            obs("B", 80.0, 0.51),
            obs("C", 30.0, 0.62),
            obs("A", 45.0, 0.49),
            obs("D", 310.0, 0.47),
        ];

        let sum: f64 = aggregate(&observations)
            .iter()
            .map(|t| t.pick_rate_pct)
            .sum();
        assert!((sum - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_aggregate_order_independent() {
        let mut observations = vec![
            obs("A", 120.0, 0.55),
            obs("B", 80.0, 0.51),
            obs("C", 30.0, 0.62),
            obs("A", 45.0, 0.49),
            obs("B", 200.0, 0.50),
        ];

        let forward = aggregate(&observations);
        observations.reverse();
        let backward = aggregate(&observations);

        assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(backward.iter()) {
            assert_eq!(f.brawler, b.brawler);
            assert!((f.total_picks - b.total_picks).abs() < EPSILON);
            assert!((f.total_wins - b.total_wins).abs() < EPSILON);
        }
    }

    #[test]
    fn test_trim_zero_retains_all() {
        let observations = vec![
            obs("A", 100.0, 0.5),
            obs("B", 50.0, 0.5),
            obs("C", 25.0, 0.5),
        ];

        let retained = trim_least_picked(aggregate(&observations), 0);
        assert_eq!(retained.len(), 3);
    }

    #[test]
    fn test_trim_drops_lowest_pick_rates() {
        let observations = vec![
            obs("A", 100.0, 0.5),
            obs("B", 50.0, 0.5),
            obs("C", 25.0, 0.5),
        ];

        let retained = trim_least_picked(aggregate(&observations), 2);
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].brawler, "A");
    }

    #[test]
    fn test_trim_tie_break_is_name_order() {
        // Equal pick rates: the later-alphabetical brawler is dropped first.
        let observations = vec![
            obs("ZETA", 100.0, 0.5),
            obs("ALPHA", 100.0, 0.5),
            obs("MID", 100.0, 0.5),
        ];

        let retained = trim_least_picked(aggregate(&observations), 1);
        assert_eq!(retained.len(), 2);
        assert_eq!(retained[0].brawler, "ALPHA");
        assert_eq!(retained[1].brawler, "MID");
    }

    #[test]
    fn test_rank_removal_at_or_above_count_is_empty_not_error() {
        let observations = vec![obs("A", 100.0, 0.5), obs("B", 50.0, 0.5)];

        for n in [2, 3, 45] {
            let ranking = rank(&observations, n).unwrap();
            assert!(ranking.rows.is_empty());
            assert_eq!(ranking.avg_win_rate, 0.0);
        }
    }

    #[test]
    fn test_rank_empty_input_is_no_data() {
        assert!(matches!(rank(&[], 0), Err(RankError::NoData)));
    }

    #[test]
    fn test_rank_filters_below_min_score() {
        // B and C sit below the field average; their scores are negative
        // and must not appear.
        let observations = vec![
            obs("A", 500.0, 0.60),
            obs("B", 400.0, 0.45),
            obs("C", 300.0, 0.44),
        ];

        let ranking = rank(&observations, 0).unwrap();
        for row in &ranking.rows {
            assert!(row.score >= MIN_SCORE, "{} below threshold", row.brawler);
        }
        assert!(ranking.rows.iter().all(|r| r.brawler != "B"));
        assert!(ranking.rows.iter().all(|r| r.brawler != "C"));
    }

    #[test]
    fn test_rank_sorted_by_score_descending() {
        let observations = vec![
            obs("A", 500.0, 0.60),
            obs("B", 450.0, 0.58),
            obs("C", 400.0, 0.56),
            obs("D", 300.0, 0.40),
        ];

        let ranking = rank(&observations, 0).unwrap();
        assert!(ranking.rows.len() >= 2);
        for pair in ranking.rows.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_rank_single_brawler_scores_zero_and_is_filtered() {
        // One brawler is its own average: diff 0, score 0, below threshold.
        let observations = vec![obs("A", 100.0, 0.5)];

        let ranking = rank(&observations, 0).unwrap();
        assert!((ranking.avg_win_rate - 50.0).abs() < EPSILON);
        assert!(ranking.rows.is_empty());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(103.5222255), 103.52);
        assert_eq!(round2(-41.698416), -41.7);
        assert_eq!(round2(70.0), 70.0);
    }
}
