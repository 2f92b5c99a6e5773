//! Console table rendering for rankings.

use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::models::Ranking;

/// One table row, pre-formatted to two decimal places.
#[derive(Debug, Serialize, Tabled)]
pub struct RankingRow {
    #[tabled(rename = "Brawler")]
    pub brawler: String,

    #[tabled(rename = "Win Rate %")]
    pub win_rate: String,

    #[tabled(rename = "Pick Rate %")]
    pub pick_rate: String,

    #[tabled(rename = "Score")]
    pub score: String,
}

/// Convert a ranking into display rows.
pub fn ranking_rows(ranking: &Ranking) -> Vec<RankingRow> {
    ranking
        .rows
        .iter()
        .map(|r| RankingRow {
            brawler: r.brawler.clone(),
            win_rate: format!("{:.2}", r.win_rate_pct),
            pick_rate: format!("{:.2}", r.pick_rate_pct),
            score: format!("{:.2}", r.score),
        })
        .collect()
}

/// Render the full report: header lines plus the rankings table.
pub fn ranking_report(mode_display: &str, map_name: &str, ranking: &Ranking) -> String {
    let table = Table::new(ranking_rows(ranking))
        .with(Style::ascii())
        .to_string();

    format!(
        "Brawler Statistics for {} - {}\nAverage Win Rate: {:.2}%\n\nBrawler Rankings:\n{}",
        mode_display, map_name, ranking.avg_win_rate, table
    )
}
