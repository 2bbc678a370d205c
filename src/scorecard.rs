// Per-player batting and bowling figures for one innings.
// Lines are stored by PlayerId (slot in the lineup); names are only attached when a
// card is exported for storage or printed.

use crate::ball::{self, Delivery};
use crate::lineup::{Lineup, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattingLine {
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub is_out: bool,
    pub dismissed_by: Option<PlayerId>,
}

impl BattingLine {
    pub fn strike_rate(&self) -> f64 {
        if self.balls == 0 {
            0.0
        } else {
            self.runs as f64 / self.balls as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BowlingLine {
    pub balls: u32,
    pub runs: u32,
    pub wickets: u32,
}

impl BowlingLine {
    pub fn economy(&self) -> f64 {
        ball::run_rate(self.runs, self.balls)
    }
}

/// Running card for one innings
#[derive(Debug, Clone, PartialEq)]
pub struct InningsCard {
    pub batting: Vec<BattingLine>,
    pub bowling: Vec<BowlingLine>,
    pub runs: u32,
    pub wickets: u32,
    pub balls: u32,
}

impl InningsCard {
    pub fn new(batters: usize, bowlers: usize) -> InningsCard {
        InningsCard {
            batting: vec![BattingLine::default(); batters],
            bowling: vec![BowlingLine::default(); bowlers],
            runs: 0,
            wickets: 0,
            balls: 0,
        }
    }

    pub fn for_lineups(batting: &Lineup, bowling: &Lineup) -> InningsCard {
        InningsCard::new(batting.len(), bowling.len())
    }

    /// Credit one ball to the striker, the bowler and the team total
    pub fn record(&mut self, striker: PlayerId, bowler: PlayerId, delivery: Delivery) {
        self.balls += 1;

        let bat = &mut self.batting[striker.index()];
        bat.balls += 1;
        bat.runs += delivery.runs;
        if delivery.is_four() {
            bat.fours += 1;
        }
        if delivery.is_six() {
            bat.sixes += 1;
        }

        let bowl = &mut self.bowling[bowler.index()];
        bowl.balls += 1;
        bowl.runs += delivery.runs;

        if delivery.is_wicket {
            bat.is_out = true;
            bat.dismissed_by = Some(bowler);
            bowl.wickets += 1;
            self.wickets += 1;
        } else {
            self.runs += delivery.runs;
        }
    }

    pub fn batter(&self, id: PlayerId) -> &BattingLine {
        &self.batting[id.index()]
    }

    pub fn bowler(&self, id: PlayerId) -> &BowlingLine {
        &self.bowling[id.index()]
    }

    pub fn overs(&self) -> f64 {
        ball::overs_display(self.balls)
    }

    pub fn run_rate(&self) -> f64 {
        ball::run_rate(self.runs, self.balls)
    }

    pub fn batting_entries(&self, batting: &Lineup, bowling: &Lineup) -> Vec<BattingEntry> {
        batting
            .ids()
            .map(|id| {
                let line = self.batter(id);
                BattingEntry {
                    name: batting.name(id).to_string(),
                    runs: line.runs,
                    balls: line.balls,
                    fours: line.fours,
                    sixes: line.sixes,
                    is_out: line.is_out,
                    dismissed_by: line.dismissed_by.map(|b| bowling.name(b).to_string()),
                }
            })
            .collect()
    }

    pub fn bowling_entries(&self, bowling: &Lineup) -> Vec<BowlingEntry> {
        bowling
            .ids()
            .map(|id| {
                let line = self.bowler(id);
                BowlingEntry {
                    name: bowling.name(id).to_string(),
                    balls: line.balls,
                    runs: line.runs,
                    wickets: line.wickets,
                }
            })
            .collect()
    }

    pub fn pretty_print(&self, batting: &Lineup, bowling: &Lineup) {
        println!(
            "{} {}/{} ({} ov, RR {:.2})",
            batting.team,
            self.runs,
            self.wickets,
            ball::overs_label(self.balls),
            self.run_rate()
        );
        println!("{:<24} {:>4} {:>4} {:>3} {:>3} {:>7}", "Batter", "R", "B", "4s", "6s", "SR");
        println!("{}", "-".repeat(50));
        for id in batting.ids() {
            let line = self.batter(id);
            let status = match line.dismissed_by {
                Some(b) => format!("b {}", bowling.name(b)),
                None if line.balls > 0 => "not out".to_string(),
                None => "did not bat".to_string(),
            };
            println!(
                "{:<24.24} {:>4} {:>4} {:>3} {:>3} {:>7.1}  {}",
                batting.name(id),
                line.runs,
                line.balls,
                line.fours,
                line.sixes,
                line.strike_rate(),
                status
            );
        }
        println!();
        println!("{:<24} {:>5} {:>4} {:>3} {:>6}", "Bowler", "O", "R", "W", "Econ");
        println!("{}", "-".repeat(50));
        for id in bowling.ids() {
            let line = self.bowler(id);
            if line.balls == 0 {
                continue;
            }
            println!(
                "{:<24.24} {:>5} {:>4} {:>3} {:>6.2}",
                bowling.name(id),
                ball::overs_label(line.balls),
                line.runs,
                line.wickets,
                line.economy()
            );
        }
        println!();
    }
}

/// Batting figures with names attached, as stored with a finished match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingEntry {
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub is_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissed_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingEntry {
    pub name: String,
    pub balls: u32,
    pub runs: u32,
    pub wickets: u32,
}
