// Auto simulation: plays whole innings with no user input.
// Bowlers take overs in lineup order, wrapping around, with no cap. Neither innings
// knows about a target, so the second innings is played out in full and the result
// is decided on runs alone.

use crate::ball::{self, RollMemory, INNINGS_BALLS};
use crate::dice::Dice;
use crate::lineup::{Lineup, PlayerId};
use crate::result::{MatchResult, Outcome};
use crate::scorecard::InningsCard;

/// The two batters at the crease
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crease {
    pub striker: PlayerId,
    pub non_striker: PlayerId,
}

impl Crease {
    pub fn opening() -> Crease {
        Crease {
            striker: PlayerId(0),
            non_striker: PlayerId(1),
        }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.striker, &mut self.non_striker);
    }

    /// Next man in takes strike: the first batter after both at the crease
    pub fn replace_striker(&mut self) {
        let next = self.striker.0.max(self.non_striker.0) + 1;
        self.striker = PlayerId(next);
    }

    /// Rotation after a ball. Wicket (or crossing) first, then the end-of-over swap.
    pub fn rotate(&mut self, wicket: bool, crossed: bool, over_complete: bool) {
        if wicket {
            self.replace_striker();
        } else if crossed {
            self.swap();
        }
        if over_complete {
            self.swap();
        }
    }
}

/// Bowler for the next ball: one over each, cycling through the whole lineup
pub fn rotation_bowler(balls_bowled: u32, bowlers: usize) -> PlayerId {
    let over = (balls_bowled / ball::BALLS_PER_OVER) as usize;
    PlayerId((over % bowlers) as u8)
}

/// Play one innings to 120 balls or all out
pub fn simulate_innings<D: Dice>(batting: &Lineup, bowling: &Lineup, dice: &mut D) -> InningsCard {
    let mut card = InningsCard::for_lineups(batting, bowling);
    let mut memory = RollMemory::default();
    let mut crease = Crease::opening();
    let all_out = batting.all_out_at();

    while card.balls < INNINGS_BALLS && card.wickets < all_out {
        let bowler = rotation_bowler(card.balls, bowling.len());
        let delivery = memory.bowl(dice.roll());
        card.record(crease.striker, bowler, delivery);
        crease.rotate(delivery.is_wicket, delivery.crossed(), ball::completes_over(card.balls));
    }

    card
}

/// Both innings cards of an auto-simulated match, kept for printing
#[derive(Debug, Clone)]
pub struct PlayedMatch {
    pub first: InningsCard,
    pub second: InningsCard,
    pub result: MatchResult,
}

/// Auto-simulate a fixture: home bats first, then away, both innings in full
pub fn play_match<D: Dice>(home: &Lineup, away: &Lineup, dice: &mut D) -> PlayedMatch {
    let first = simulate_innings(home, away, dice);
    let second = simulate_innings(away, home, dice);
    let winner = Outcome::by_runs(&home.team, first.runs, &away.team, second.runs);

    tracing::debug!(
        home = %home.team,
        away = %away.team,
        home_score = first.runs,
        away_score = second.runs,
        "auto simulation finished"
    );

    let result = MatchResult::from_cards(home, away, &first, &second, winner);
    PlayedMatch { first, second, result }
}

pub fn simulate_match<D: Dice>(home: &Lineup, away: &Lineup, dice: &mut D) -> MatchResult {
    play_match(home, away, dice).result
}
