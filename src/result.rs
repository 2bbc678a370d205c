// The record of a finished match, in the shape handed to storage.
// Both the auto simulator and the arena produce a MatchResult.

use crate::lineup::Lineup;
use crate::scorecard::{BattingEntry, BowlingEntry, InningsCard};
use serde::{Deserialize, Serialize};

/// Winner of a match: a team name, or a tie.
/// Stored as a bare string, with "Tied" reserved for the tie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Outcome {
    Won(String),
    Tied,
}

pub const TIED: &str = "Tied";

impl From<String> for Outcome {
    fn from(s: String) -> Self {
        if s == TIED {
            Outcome::Tied
        } else {
            Outcome::Won(s)
        }
    }
}

impl From<Outcome> for String {
    fn from(o: Outcome) -> Self {
        match o {
            Outcome::Won(team) => team,
            Outcome::Tied => TIED.to_string(),
        }
    }
}

impl Outcome {
    pub fn winner(&self) -> Option<&str> {
        match self {
            Outcome::Won(team) => Some(team),
            Outcome::Tied => None,
        }
    }

    /// More runs wins, equal runs is a tie
    pub fn by_runs(home: &str, home_runs: u32, away: &str, away_runs: u32) -> Outcome {
        use std::cmp::Ordering;
        match home_runs.cmp(&away_runs) {
            Ordering::Greater => Outcome::Won(home.to_string()),
            Ordering::Less => Outcome::Won(away.to_string()),
            Ordering::Equal => Outcome::Tied,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Won(team) => write!(f, "{} won", team),
            Outcome::Tied => write!(f, "match tied"),
        }
    }
}

/// Scorecards for both innings with player names attached.
/// Innings 1 is always the home side batting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStats {
    pub innings1_batting: Vec<BattingEntry>,
    pub innings1_bowling: Vec<BowlingEntry>,
    pub innings2_batting: Vec<BattingEntry>,
    pub innings2_bowling: Vec<BowlingEntry>,
}

impl DetailedStats {
    pub fn from_cards(
        home: &Lineup,
        away: &Lineup,
        first: &InningsCard,
        second: &InningsCard,
    ) -> DetailedStats {
        DetailedStats {
            innings1_batting: first.batting_entries(home, away),
            innings1_bowling: first.bowling_entries(away),
            innings2_batting: second.batting_entries(away, home),
            innings2_bowling: second.bowling_entries(home),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub home_score: u32,
    pub home_wickets: u32,
    pub home_overs: f64,
    pub away_score: u32,
    pub away_wickets: u32,
    pub away_overs: f64,
    pub winner: Outcome,
    pub detailed_stats: DetailedStats,
}

impl MatchResult {
    /// Assemble from the two innings cards. `first` is the home innings.
    pub fn from_cards(
        home: &Lineup,
        away: &Lineup,
        first: &InningsCard,
        second: &InningsCard,
        winner: Outcome,
    ) -> MatchResult {
        MatchResult {
            home_score: first.runs,
            home_wickets: first.wickets,
            home_overs: first.overs(),
            away_score: second.runs,
            away_wickets: second.wickets,
            away_overs: second.overs(),
            winner,
            detailed_stats: DetailedStats::from_cards(home, away, first, second),
        }
    }

    pub fn summary(&self, home: &str, away: &str) -> String {
        format!(
            "{} {}/{} ({}) v {} {}/{} ({}): {}",
            home,
            self.home_score,
            self.home_wickets,
            self.home_overs,
            away,
            self.away_score,
            self.away_wickets,
            self.away_overs,
            self.winner
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_by_runs() {
        assert_eq!(Outcome::by_runs("H", 150, "A", 120), Outcome::Won("H".into()));
        assert_eq!(Outcome::by_runs("H", 119, "A", 120), Outcome::Won("A".into()));
        assert_eq!(Outcome::by_runs("H", 120, "A", 120), Outcome::Tied);
    }

    #[test]
    fn test_outcome_serializes_as_plain_string() {
        let won = serde_json::to_string(&Outcome::Won("Lions".into())).unwrap();
        assert_eq!(won, "\"Lions\"");
        let tied = serde_json::to_string(&Outcome::Tied).unwrap();
        assert_eq!(tied, "\"Tied\"");
        let back: Outcome = serde_json::from_str("\"Tied\"").unwrap();
        assert_eq!(back, Outcome::Tied);
        assert_eq!(back.winner(), None);
    }

    #[test]
    fn test_result_field_names() {
        let result = MatchResult {
            home_score: 1,
            home_wickets: 0,
            home_overs: 0.1,
            away_score: 0,
            away_wickets: 0,
            away_overs: 0.1,
            winner: Outcome::Won("H".into()),
            detailed_stats: DetailedStats::default(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["homeScore"], 1);
        assert_eq!(json["winner"], "H");
        assert!(json["detailedStats"]["innings2Bowling"].is_array());
    }
}
