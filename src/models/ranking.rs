//! Ranked output models.

use serde::{Deserialize, Serialize};

/// One brawler in the final ranking.
///
/// All percentage fields are rounded to two decimal places; rounding happens
/// once at the engine's output boundary, arithmetic upstream is full
/// double precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedBrawler {
    /// Brawler identifier.
    pub brawler: String,

    /// Aggregate win rate as a percentage.
    pub win_rate_pct: f64,

    /// Share of all observed picks as a percentage.
    pub pick_rate_pct: f64,

    /// Composite desirability score.
    pub score: f64,
}

/// Result of one ranking computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ranking {
    /// Mean win-rate percentage over the retained (post-trim) set,
    /// unrounded. Zero when the retained set is empty.
    pub avg_win_rate: f64,

    /// Brawlers passing the score filter, in descending score order.
    pub rows: Vec<RankedBrawler>,
}

impl Ranking {
    /// Whether any brawler survived trimming and the score filter.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
