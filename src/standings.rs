// Points table bookkeeping.
// A win is worth 2 points, a tie 1 each. Net run rate uses a fixed 20-over
// approximation per match: (home runs / 20) - (away runs / 20), added to the home
// side and subtracted from the away side, so every match contributes zero in total.

use crate::ball::INNINGS_OVERS;
use crate::result::{MatchResult, Outcome};
use serde::{Deserialize, Serialize};

pub const POINTS_FOR_WIN: u32 = 2;
pub const POINTS_FOR_TIE: u32 = 1;

/// Cumulative season record for one team. Starts at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub tied: u32,
    pub points: u32,
    #[serde(rename = "nrr")]
    pub net_run_rate: f64,
}

/// NRR swing for the home side in one match
pub fn nrr_delta(home_runs: u32, away_runs: u32) -> f64 {
    let overs = INNINGS_OVERS as f64;
    home_runs as f64 / overs - away_runs as f64 / overs
}

/// Fold a finished match into both teams' records
pub fn apply_result(
    result: &MatchResult,
    home_name: &str,
    home: &mut TeamRecord,
    away_name: &str,
    away: &mut TeamRecord,
) {
    home.played += 1;
    away.played += 1;

    match &result.winner {
        Outcome::Won(team) if team == home_name => {
            home.won += 1;
            home.points += POINTS_FOR_WIN;
            away.lost += 1;
        }
        Outcome::Won(team) if team == away_name => {
            away.won += 1;
            away.points += POINTS_FOR_WIN;
            home.lost += 1;
        }
        // a winner that is neither side scores as a tie
        Outcome::Won(team) => {
            tracing::warn!(winner = %team, home = home_name, away = away_name, "winner is neither side, scoring as a tie");
            home.tied += 1;
            away.tied += 1;
            home.points += POINTS_FOR_TIE;
            away.points += POINTS_FOR_TIE;
        }
        Outcome::Tied => {
            home.tied += 1;
            away.tied += 1;
            home.points += POINTS_FOR_TIE;
            away.points += POINTS_FOR_TIE;
        }
    }

    let delta = nrr_delta(result.home_score, result.away_score);
    home.net_run_rate += delta;
    away.net_run_rate -= delta;

    tracing::debug!(
        home = home_name,
        away = away_name,
        nrr_delta = delta,
        "standings updated"
    );
}

/// A row in the printed points table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow<'a> {
    pub team: &'a str,
    pub record: &'a TeamRecord,
}

/// Points first, then net run rate, both descending
pub fn sort_table(rows: &mut [TableRow<'_>]) {
    rows.sort_by(|a, b| {
        b.record
            .points
            .cmp(&a.record.points)
            .then_with(|| b.record.net_run_rate.total_cmp(&a.record.net_run_rate))
    });
}

pub fn print_table(rows: &[TableRow<'_>]) {
    println!(
        "{:>4} {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>8}",
        "Pos", "Team", "P", "W", "L", "T", "Pts", "NRR"
    );
    println!("{}", "-".repeat(60));
    for (i, row) in rows.iter().enumerate() {
        let r = row.record;
        println!(
            "{:>4} {:<24.24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>+8.3}",
            i + 1,
            row.team,
            r.played,
            r.won,
            r.lost,
            r.tied,
            r.points,
            r.net_run_rate
        );
    }
}
