// A Lineup is the ordered XI a team takes into one match.
// Names are resolved once, when the lineup is picked, into PlayerIds (the
// player's slot in the XI). Everything downstream keys stats by PlayerId.

use crate::error::{LeagueError, Result};
use crate::roster::{RoleSummary, TeamRoster};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

/// Number of players a team fields
pub const XI: usize = 11;

/// Stable per-match identifier: the player's position in their lineup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lineup {
    pub team: String,
    names: Vec<String>,
    lookup: FnvHashMap<String, PlayerId>,
}

impl Lineup {
    /// Pick an XI from a roster. Every name must be on the roster, exactly once.
    pub fn select(roster: &TeamRoster, names: &[String]) -> Result<Lineup> {
        let invalid = |reason: String| LeagueError::InvalidLineup {
            team: roster.name.clone(),
            reason,
        };

        if names.len() != XI {
            return Err(invalid(format!("expected {} players, got {}", XI, names.len())));
        }
        for name in names {
            if roster.player(name).is_none() {
                return Err(invalid(format!("'{}' is not on the roster", name)));
            }
        }
        Lineup::from_names(&roster.name, names)
    }

    /// First eleven players on the roster, in roster order
    pub fn default_xi(roster: &TeamRoster) -> Result<Lineup> {
        let names: Vec<String> = roster.players.iter().take(XI).map(|p| p.name.clone()).collect();
        Lineup::select(roster, &names)
    }

    /// Ad-hoc lineup of any size from two players up, no roster check
    pub fn from_names(team: &str, names: &[String]) -> Result<Lineup> {
        let invalid = |reason: String| LeagueError::InvalidLineup {
            team: team.to_string(),
            reason,
        };
        if names.len() < 2 {
            return Err(invalid("need at least two players".to_string()));
        }
        if names.len() > u8::MAX as usize {
            return Err(invalid(format!("{} players is too many", names.len())));
        }

        let mut lookup = FnvHashMap::default();
        for (i, name) in names.iter().enumerate() {
            if lookup.insert(name.clone(), PlayerId(i as u8)).is_some() {
                return Err(invalid(format!("'{}' picked twice", name)));
            }
        }

        Ok(Lineup {
            team: team.to_string(),
            names: names.to_vec(),
            lookup,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn id_of(&self, name: &str) -> Option<PlayerId> {
        self.lookup.get(name).copied()
    }

    pub fn name(&self, id: PlayerId) -> &str {
        &self.names[id.index()]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Ids in batting order
    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        (0..self.names.len()).map(|i| PlayerId(i as u8))
    }

    /// Wickets that end the innings: ten, or fewer when the lineup runs out of partners
    pub fn all_out_at(&self) -> u32 {
        10.min(self.names.len() as u32 - 1)
    }

    pub fn role_summary(&self, roster: &TeamRoster) -> RoleSummary {
        RoleSummary::of(self.names.iter().filter_map(|n| roster.player(n)))
    }
}

#[cfg(test)]
pub(crate) fn test_lineup(team: &str, size: usize) -> Lineup {
    let names: Vec<String> = (1..=size).map(|i| format!("{}{}", team, i)).collect();
    Lineup::from_names(team, &names).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Player;

    fn roster(n: usize) -> TeamRoster {
        let players = (1..=n)
            .map(|i| Player::new(&format!("P{}", i), if i > 7 { "Bowler" } else { "Batter" }))
            .collect();
        TeamRoster::new("Lions", players)
    }

    #[test]
    fn test_default_xi_takes_first_eleven() {
        let lineup = Lineup::default_xi(&roster(15)).unwrap();
        assert_eq!(lineup.len(), XI);
        assert_eq!(lineup.name(PlayerId(0)), "P1");
        assert_eq!(lineup.name(PlayerId(10)), "P11");
        assert_eq!(lineup.id_of("P11"), Some(PlayerId(10)));
        assert_eq!(lineup.id_of("P12"), None);
        assert_eq!(lineup.all_out_at(), 10);
    }

    #[test]
    fn test_short_roster_rejected() {
        let err = Lineup::default_xi(&roster(9)).unwrap_err();
        assert!(matches!(err, LeagueError::InvalidLineup { .. }));
    }

    #[test]
    fn test_unknown_and_duplicate_names_rejected() {
        let r = roster(12);
        let mut names: Vec<String> = (1..=10).map(|i| format!("P{}", i)).collect();
        names.push("Nobody".to_string());
        assert!(Lineup::select(&r, &names).is_err());

        names.pop();
        names.push("P1".to_string());
        assert!(Lineup::select(&r, &names).is_err());
    }

    #[test]
    fn test_all_out_for_short_lineups() {
        assert_eq!(test_lineup("A", 2).all_out_at(), 1);
        assert_eq!(test_lineup("A", 5).all_out_at(), 4);
        assert_eq!(test_lineup("A", 14).all_out_at(), 10);
    }

    #[test]
    fn test_role_summary_of_xi() {
        let r = roster(11);
        let lineup = Lineup::default_xi(&r).unwrap();
        let s = lineup.role_summary(&r);
        assert_eq!(s.batters, 7);
        assert_eq!(s.bowlers, 4);
    }
}
