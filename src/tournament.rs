// A tournament is the teams, their running records, and the fixture list.
// The schedule is generated once at creation and never reordered. Each match goes
// from incomplete to complete exactly once, and completing it folds the result into
// both teams' records.

use crate::error::{LeagueError, Result};
use crate::lineup::Lineup;
use crate::result::{DetailedStats, MatchResult, Outcome};
use crate::roster::{self, TeamRoster};
use crate::schedule;
use crate::standings::{self, TableRow, TeamRecord};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(flatten)]
    pub roster: TeamRoster,
    #[serde(default)]
    pub record: TeamRecord,
}

impl Team {
    pub fn name(&self) -> &str {
        &self.roster.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub home_team: String,
    pub away_team: String,
    pub sequence_number: u32,
    pub is_completed: bool,
    #[serde(default)]
    pub home_squad: Vec<String>,
    #[serde(default)]
    pub away_squad: Vec<String>,
    #[serde(default)]
    pub home_score: u32,
    #[serde(default)]
    pub home_wickets: u32,
    #[serde(default)]
    pub home_overs: f64,
    #[serde(default)]
    pub away_score: u32,
    #[serde(default)]
    pub away_wickets: u32,
    #[serde(default)]
    pub away_overs: f64,
    #[serde(default)]
    pub winner: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_stats: Option<DetailedStats>,
}

impl Match {
    fn scheduled(fixture: schedule::Fixture) -> Match {
        Match {
            home_team: fixture.home_team,
            away_team: fixture.away_team,
            sequence_number: fixture.sequence_number,
            is_completed: false,
            home_squad: Vec::new(),
            away_squad: Vec::new(),
            home_score: 0,
            home_wickets: 0,
            home_overs: 0.0,
            away_score: 0,
            away_wickets: 0,
            away_overs: 0.0,
            winner: None,
            detailed_stats: None,
        }
    }

    pub fn label(&self) -> String {
        format!("Match {}: {} v {}", self.sequence_number, self.home_team, self.away_team)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: Status,
    pub teams: Vec<Team>,
    /// Sorted by sequence number
    pub matches: Vec<Match>,
}

impl Tournament {
    pub fn create<R: Rng + ?Sized>(name: &str, rosters: Vec<TeamRoster>, rng: &mut R) -> Result<Tournament> {
        // the slug is the store key, so it must not be empty
        if slugify(name).is_empty() {
            return Err(LeagueError::Roster(format!("tournament name '{}' has no ASCII letters or digits", name)));
        }
        roster::validate(&rosters)?;

        let names: Vec<String> = rosters.iter().map(|r| r.name.clone()).collect();
        let mut matches: Vec<Match> = schedule::double_round_robin(&names, rng)
            .into_iter()
            .map(Match::scheduled)
            .collect();
        matches.sort_by_key(|m| m.sequence_number);

        let status = if matches.is_empty() { Status::Completed } else { Status::Active };
        let teams = rosters
            .into_iter()
            .map(|roster| Team { roster, record: TeamRecord::default() })
            .collect();

        tracing::info!(tournament = name, teams = names.len(), matches = matches.len(), "tournament created");

        Ok(Tournament {
            name: name.to_string(),
            created_at: Utc::now(),
            status,
            teams,
            matches,
        })
    }

    /// File-name friendly form of the name: lowercase alphanumerics joined by '-'
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    pub fn team(&self, name: &str) -> Result<&Team> {
        self.teams
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| LeagueError::TeamNotFound(name.to_string()))
    }

    fn team_index(&self, name: &str) -> Result<usize> {
        self.teams
            .iter()
            .position(|t| t.name() == name)
            .ok_or_else(|| LeagueError::TeamNotFound(name.to_string()))
    }

    pub fn fixture(&self, sequence: u32) -> Result<&Match> {
        self.matches
            .iter()
            .find(|m| m.sequence_number == sequence)
            .ok_or(LeagueError::MatchNotFound(sequence))
    }

    /// First unplayed match in sequence order
    pub fn next_fixture(&self) -> Option<&Match> {
        self.matches.iter().find(|m| !m.is_completed)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Match> + '_ {
        self.matches.iter().filter(|m| !m.is_completed)
    }

    pub fn completed_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_completed).count()
    }

    /// Each side's first eleven, in roster order
    pub fn default_lineups(&self, sequence: u32) -> Result<(Lineup, Lineup)> {
        let fixture = self.fixture(sequence)?;
        let home = Lineup::default_xi(&self.team(&fixture.home_team)?.roster)?;
        let away = Lineup::default_xi(&self.team(&fixture.away_team)?.roster)?;
        Ok((home, away))
    }

    /// Complete a match and update both teams' records
    pub fn record_result(
        &mut self,
        sequence: u32,
        home_xi: &Lineup,
        away_xi: &Lineup,
        result: MatchResult,
    ) -> Result<()> {
        let idx = self
            .matches
            .iter()
            .position(|m| m.sequence_number == sequence)
            .ok_or(LeagueError::MatchNotFound(sequence))?;
        if self.matches[idx].is_completed {
            return Err(LeagueError::MatchAlreadyPlayed(sequence));
        }

        let (home_name, away_name) = (self.matches[idx].home_team.clone(), self.matches[idx].away_team.clone());
        for (xi, expected) in [(home_xi, &home_name), (away_xi, &away_name)] {
            if &xi.team != expected {
                return Err(LeagueError::InvalidLineup {
                    team: xi.team.clone(),
                    reason: format!("match {} is {} v {}", sequence, home_name, away_name),
                });
            }
        }
        let home_idx = self.team_index(&home_name)?;
        let away_idx = self.team_index(&away_name)?;

        let (home, away) = pair_mut(&mut self.teams, home_idx, away_idx);
        standings::apply_result(&result, &home.roster.name, &mut home.record, &away.roster.name, &mut away.record);

        let m = &mut self.matches[idx];
        m.home_squad = home_xi.names().to_vec();
        m.away_squad = away_xi.names().to_vec();
        m.home_score = result.home_score;
        m.home_wickets = result.home_wickets;
        m.home_overs = result.home_overs;
        m.away_score = result.away_score;
        m.away_wickets = result.away_wickets;
        m.away_overs = result.away_overs;
        m.winner = Some(result.winner);
        m.detailed_stats = Some(result.detailed_stats);
        m.is_completed = true;

        tracing::info!(
            tournament = %self.name,
            sequence,
            home = %home_name,
            away = %away_name,
            "match recorded"
        );

        if self.matches.iter().all(|m| m.is_completed) {
            self.status = Status::Completed;
            tracing::info!(tournament = %self.name, "tournament completed");
        }
        Ok(())
    }

    /// Teams ordered by points, then net run rate
    pub fn points_table(&self) -> Vec<TableRow<'_>> {
        let mut rows: Vec<TableRow<'_>> = self
            .teams
            .iter()
            .map(|t| TableRow { team: t.name(), record: &t.record })
            .collect();
        standings::sort_table(&mut rows);
        rows
    }
}

fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::innings::simulate_match;
    use crate::roster::Player;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    pub(crate) fn roster(team: &str, size: usize) -> TeamRoster {
        let players = (1..=size)
            .map(|i| Player::new(&format!("{}{}", team, i), if i > 6 { "Bowler" } else { "Batter" }))
            .collect();
        TeamRoster::new(team, players)
    }

    pub(crate) fn league(teams: &[&str]) -> Tournament {
        let rosters = teams.iter().map(|t| roster(t, 12)).collect();
        Tournament::create("Test Cup", rosters, &mut ChaCha8Rng::seed_from_u64(5)).unwrap()
    }

    fn sixes_v_fours(t: &Tournament, seq: u32) -> (Lineup, Lineup, MatchResult) {
        let (home, away) = t.default_lineups(seq).unwrap();
        let mut rolls = vec![6u8; 120];
        rolls.extend(vec![4u8; 120]);
        let result = simulate_match(&home, &away, &mut ScriptedDice::new(&rolls));
        (home, away, result)
    }

    #[test]
    fn test_create() {
        let t = league(&["A", "B", "C", "D"]);
        assert_eq!(t.matches.len(), 12);
        assert_eq!(t.status, Status::Active);
        let seqs: Vec<u32> = t.matches.iter().map(|m| m.sequence_number).collect();
        assert_eq!(seqs, (1..=12).collect::<Vec<u32>>());
        assert!(t.teams.iter().all(|team| team.record == TeamRecord::default()));
        assert_eq!(t.next_fixture().unwrap().sequence_number, 1);
        assert_eq!(t.slug(), "test-cup");
    }

    #[test]
    fn test_single_team_has_no_fixtures() {
        let t = Tournament::create("Solo", vec![roster("A", 11)], &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert!(t.matches.is_empty());
        assert!(t.next_fixture().is_none());
        assert_eq!(t.status, Status::Completed);
    }

    #[test]
    fn test_name_without_slug_rejected() {
        for name in ["", "   ", "!!!", "-- ++"] {
            let res = Tournament::create(name, vec![roster("A", 11), roster("B", 11)], &mut ChaCha8Rng::seed_from_u64(1));
            assert!(matches!(res, Err(LeagueError::Roster(_))), "{:?} accepted", name);
        }
        let t = Tournament::create("Cup 2", vec![roster("A", 11)], &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!(t.slug(), "cup-2");
    }

    #[test]
    fn test_team_named_tied_rejected() {
        let res = Tournament::create("Cup", vec![roster("Tied", 11), roster("B", 11)], &mut ChaCha8Rng::seed_from_u64(1));
        assert!(matches!(res, Err(LeagueError::Roster(_))));
    }

    #[test]
    fn test_record_result_updates_match_and_records() {
        let mut t = league(&["A", "B", "C"]);
        let (home, away, result) = sixes_v_fours(&t, 1);
        let home_name = home.team.clone();
        let away_name = away.team.clone();
        t.record_result(1, &home, &away, result).unwrap();

        let m = t.fixture(1).unwrap();
        assert!(m.is_completed);
        assert_eq!(m.home_squad.len(), 11);
        assert_eq!((m.home_score, m.away_score), (720, 480));
        assert_eq!(m.winner, Some(Outcome::Won(home_name.clone())));
        assert!(m.detailed_stats.is_some());

        let h = &t.team(&home_name).unwrap().record;
        let a = &t.team(&away_name).unwrap().record;
        assert_eq!((h.won, h.points), (1, 2));
        assert_eq!((a.lost, a.points), (1, 0));
        assert!((h.net_run_rate - 12.0).abs() < 1e-9);
        assert_eq!(t.next_fixture().unwrap().sequence_number, 2);
        assert_eq!(t.points_table()[0].team, home_name);
    }

    #[test]
    fn test_match_recorded_only_once() {
        let mut t = league(&["A", "B"]);
        let (home, away, result) = sixes_v_fours(&t, 1);
        t.record_result(1, &home, &away, result.clone()).unwrap();
        let err = t.record_result(1, &home, &away, result).unwrap_err();
        assert!(matches!(err, LeagueError::MatchAlreadyPlayed(1)));
        assert_eq!(t.team(&home.team).unwrap().record.played, 1);
    }

    #[test]
    fn test_wrong_lineups_rejected() {
        let mut t = league(&["A", "B"]);
        let (home, away, result) = sixes_v_fours(&t, 1);
        let err = t.record_result(1, &away, &home, result).unwrap_err();
        assert!(matches!(err, LeagueError::InvalidLineup { .. }));
        assert!(!t.fixture(1).unwrap().is_completed);
    }

    #[test]
    fn test_unknown_match() {
        let mut t = league(&["A", "B"]);
        let (home, away, result) = sixes_v_fours(&t, 1);
        assert!(matches!(t.record_result(9, &home, &away, result), Err(LeagueError::MatchNotFound(9))));
    }

    #[test]
    fn test_completes_after_last_match() {
        let mut t = league(&["A", "B"]);
        for seq in 1..=2 {
            let (home, away, result) = sixes_v_fours(&t, seq);
            t.record_result(seq, &home, &away, result).unwrap();
        }
        assert_eq!(t.status, Status::Completed);
        assert!(t.next_fixture().is_none());
        // one home win each, equal and opposite NRR
        let a = &t.team("A").unwrap().record;
        let b = &t.team("B").unwrap().record;
        assert_eq!((a.points, b.points), (2, 2));
        assert!((a.net_run_rate + b.net_run_rate).abs() < 1e-9);
    }

    #[test]
    fn test_json_shape() {
        let t = league(&["A", "B"]);
        let json = serde_json::to_value(&t).unwrap();
        assert!(json["createdAt"].is_string());
        assert_eq!(json["status"], "Active");
        assert_eq!(json["teams"][0]["name"], "A");
        assert_eq!(json["teams"][0]["record"]["points"], 0);
        assert_eq!(json["matches"][0]["isCompleted"], false);
        let back: Tournament = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Premier  League 2026!"), "premier-league-2026");
        assert_eq!(slugify("--x--"), "x");
    }
}
