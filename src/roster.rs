// This file ingests the team rosters that seed a tournament.
// Rosters come either from a JSON document ({"teams": [{"name", "players": [...]}]})
// or from a flat CSV with one player per row (team,name,role,country).

use crate::error::{LeagueError, Result};
use crate::result::TIED;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Display category for a player. Never consulted by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Batter,
    Bowler,
    AllRounder,
}

impl Role {
    /// Classify a free-text role ("Right-arm pacer", "Batting All-Rounder", ...)
    pub fn parse(text: &str) -> Role {
        let lower = text.to_lowercase();
        if lower.contains("all-rounder") {
            Role::AllRounder
        } else if lower.contains("bowler") || lower.contains("pacer") || lower.contains("spinner") {
            Role::Bowler
        } else {
            Role::Batter
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    /// Role as written in the source data
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Player {
    pub fn new(name: &str, role: &str) -> Player {
        Player {
            name: name.to_string(),
            role: role.to_string(),
            country: None,
        }
    }

    pub fn category(&self) -> Role {
        Role::parse(&self.role)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamRoster {
    pub name: String,
    pub players: Vec<Player>,
}

impl TeamRoster {
    pub fn new(name: &str, players: Vec<Player>) -> TeamRoster {
        TeamRoster {
            name: name.to_string(),
            players,
        }
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }
}

/// Counts of each role in a selected XI, as shown on the selection screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleSummary {
    pub batters: usize,
    pub bowlers: usize,
    pub all_rounders: usize,
}

impl RoleSummary {
    pub fn of<'a>(players: impl IntoIterator<Item = &'a Player>) -> RoleSummary {
        let mut summary = RoleSummary::default();
        for p in players {
            match p.category() {
                Role::Batter => summary.batters += 1,
                Role::Bowler => summary.bowlers += 1,
                Role::AllRounder => summary.all_rounders += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    teams: Vec<TeamRoster>,
}

/// Load rosters from a `.json` or `.csv` file, chosen by extension
pub fn load_rosters(path: &Path) -> Result<Vec<TeamRoster>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let teams = if is_csv {
        let rdr = csv::Reader::from_path(path)?;
        rosters_from_csv(rdr)?
    } else {
        let content = fs::read_to_string(path)?;
        rosters_from_json(&content)?
    };

    tracing::debug!(path = %path.display(), teams = teams.len(), "rosters loaded");
    Ok(teams)
}

pub fn rosters_from_json(content: &str) -> Result<Vec<TeamRoster>> {
    let file: RosterFile = serde_json::from_str(content)?;
    validate(&file.teams)?;
    Ok(file.teams)
}

/// Rows are grouped by team in the order each team first appears
pub fn rosters_from_csv<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<Vec<TeamRoster>> {
    let headers = rdr.headers()?.clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| LeagueError::Roster(format!("missing column '{}'", name)))
    };
    let team_col = column("team")?;
    let name_col = column("name")?;
    let role_col = column("role")?;
    let country_col = column("country").ok();

    let mut teams: Vec<TeamRoster> = Vec::new();
    for result in rdr.records() {
        let record: StringRecord = result?;
        let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");

        let team_name = field(team_col);
        let player_name = field(name_col);
        if team_name.is_empty() || player_name.is_empty() {
            continue;
        }

        let player = Player {
            name: player_name.to_string(),
            role: field(role_col).to_string(),
            country: country_col.map(field).filter(|c| !c.is_empty()).map(str::to_string),
        };

        match teams.iter_mut().find(|t| t.name == team_name) {
            Some(team) => team.players.push(player),
            None => teams.push(TeamRoster::new(team_name, vec![player])),
        }
    }

    validate(&teams)?;
    Ok(teams)
}

pub(crate) fn validate(teams: &[TeamRoster]) -> Result<()> {
    let mut team_names = HashSet::new();
    for team in teams {
        if team.name == TIED {
            return Err(LeagueError::Roster(format!("'{}' is reserved for tied matches", TIED)));
        }
        if !team_names.insert(team.name.as_str()) {
            return Err(LeagueError::Roster(format!("duplicate team '{}'", team.name)));
        }
        let mut player_names = HashSet::new();
        for p in &team.players {
            if !player_names.insert(p.name.as_str()) {
                return Err(LeagueError::Roster(format!(
                    "duplicate player '{}' in team '{}'",
                    p.name, team.name
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Batting All-Rounder"), Role::AllRounder);
        assert_eq!(Role::parse("Right-arm Pacer"), Role::Bowler);
        assert_eq!(Role::parse("Leg Spinner"), Role::Bowler);
        assert_eq!(Role::parse("Fast Bowler"), Role::Bowler);
        assert_eq!(Role::parse("Wicket-keeper Batter"), Role::Batter);
        assert_eq!(Role::parse(""), Role::Batter);
    }

    #[test]
    fn test_json_rosters() {
        let json = r#"{"teams": [
            {"name": "Lions", "players": [
                {"name": "A", "role": "Batter", "country": "IND"},
                {"name": "B", "role": "Spinner"}
            ]},
            {"name": "Tigers", "players": [{"name": "C", "role": "All-rounder"}]}
        ]}"#;
        let teams = rosters_from_json(json).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].players[0].country.as_deref(), Some("IND"));
        assert_eq!(teams[0].player("B").unwrap().category(), Role::Bowler);
        assert_eq!(teams[1].players[0].category(), Role::AllRounder);
    }

    #[test]
    fn test_csv_rosters_grouped_in_first_seen_order() {
        let data = "team,name,role,country\nTigers,T1,Batter,\nLions,L1,Pacer,AUS\nTigers,T2,Bowler,\n";
        let rdr = csv::Reader::from_reader(data.as_bytes());
        let teams = rosters_from_csv(rdr).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].name, "Tigers");
        assert_eq!(teams[0].players.len(), 2);
        assert_eq!(teams[1].players[0].country.as_deref(), Some("AUS"));
        assert_eq!(teams[0].players[0].country, None);
    }

    #[test]
    fn test_csv_missing_column() {
        let data = "team,name\nTigers,T1\n";
        let rdr = csv::Reader::from_reader(data.as_bytes());
        assert!(matches!(rosters_from_csv(rdr), Err(LeagueError::Roster(_))));
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let json = r#"{"teams": [{"name": "Lions", "players": [
            {"name": "A", "role": "Batter"}, {"name": "A", "role": "Bowler"}]}]}"#;
        assert!(rosters_from_json(json).is_err());
    }

    #[test]
    fn test_team_named_tied_rejected() {
        let json = r#"{"teams": [{"name": "Tied", "players": []}, {"name": "Lions", "players": []}]}"#;
        assert!(matches!(rosters_from_json(json), Err(LeagueError::Roster(_))));
        let data = "team,name,role\nTied,T1,Batter\n";
        let rdr = csv::Reader::from_reader(data.as_bytes());
        assert!(matches!(rosters_from_csv(rdr), Err(LeagueError::Roster(_))));
    }

    #[test]
    fn test_duplicate_team_rejected() {
        let json = r#"{"teams": [{"name": "Lions", "players": []}, {"name": "Lions", "players": []}]}"#;
        assert!(rosters_from_json(json).is_err());
    }

    #[test]
    fn test_role_summary() {
        let players = vec![
            Player::new("a", "Batter"),
            Player::new("b", "Pacer"),
            Player::new("c", "All-Rounder"),
            Player::new("d", "Opening Batter"),
        ];
        let s = RoleSummary::of(&players);
        assert_eq!(s, RoleSummary { batters: 2, bowlers: 1, all_rounders: 1 });
    }
}
