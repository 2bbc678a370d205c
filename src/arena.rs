// The arena: a match played one action at a time.
//
// Same dice rules and strike rotation as the auto simulator, plus
//   - a bowler is capped at 24 balls (4 overs) per innings
//   - nobody bowls two overs in a row
//   - the chase stops the moment the second innings passes the first innings score
//
// Every action is a no-op unless the session is in the phase that expects it, and
// ineligible picks are refused, so a stale or duplicated UI event can never corrupt
// the score. Timing (the innings break and the pause before the result is handed
// over) lives in session.rs; this type is synchronous and owns no clocks.

use crate::ball::{self, RollMemory, INNINGS_BALLS};
use crate::dice::Dice;
use crate::innings::Crease;
use crate::lineup::{Lineup, PlayerId};
use crate::result::{MatchResult, Outcome};
use crate::scorecard::InningsCard;
use serde::Serialize;
use std::collections::VecDeque;

/// Limits applied in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaRules {
    /// Balls a bowler may deliver in one innings
    pub over_cap_balls: u32,
    /// Events kept in the live feed
    pub feed_length: usize,
}

impl Default for ArenaRules {
    fn default() -> Self {
        ArenaRules {
            over_cap_balls: 24,
            feed_length: 12,
        }
    }
}

/// Where the session is, and which of striker / non-striker / bowler is still missing.
/// Only `ReadyToRoll` has all three, so only it can bowl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingStriker {
        non_striker: Option<PlayerId>,
        bowler: Option<PlayerId>,
    },
    AwaitingNonStriker {
        striker: PlayerId,
        bowler: Option<PlayerId>,
    },
    AwaitingBowler {
        crease: Crease,
    },
    ReadyToRoll {
        crease: Crease,
        bowler: PlayerId,
    },
    InningsBreak,
    Finished,
}

impl Phase {
    fn fresh() -> Phase {
        Phase::AwaitingStriker {
            non_striker: None,
            bowler: None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::AwaitingStriker { .. } => "AwaitingStriker",
            Phase::AwaitingNonStriker { .. } => "AwaitingNonStriker",
            Phase::AwaitingBowler { .. } => "AwaitingBowler",
            Phase::ReadyToRoll { .. } => "ReadyToRoll",
            Phase::InningsBreak => "InningsBreak",
            Phase::Finished => "Finished",
        }
    }

    pub fn awaiting_batter(&self) -> bool {
        matches!(self, Phase::AwaitingStriker { .. } | Phase::AwaitingNonStriker { .. })
    }

    fn striker(&self) -> Option<PlayerId> {
        match *self {
            Phase::AwaitingNonStriker { striker, .. } => Some(striker),
            Phase::AwaitingBowler { crease } | Phase::ReadyToRoll { crease, .. } => Some(crease.striker),
            _ => None,
        }
    }

    fn non_striker(&self) -> Option<PlayerId> {
        match *self {
            Phase::AwaitingStriker { non_striker, .. } => non_striker,
            Phase::AwaitingBowler { crease } | Phase::ReadyToRoll { crease, .. } => Some(crease.non_striker),
            _ => None,
        }
    }

    fn bowler(&self) -> Option<PlayerId> {
        match *self {
            Phase::AwaitingStriker { bowler, .. } | Phase::AwaitingNonStriker { bowler, .. } => bowler,
            Phase::ReadyToRoll { bowler, .. } => Some(bowler),
            _ => None,
        }
    }
}

/// Why an action was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refused {
    WrongPhase,
    Ineligible,
}

/// One entry in the live feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BallEvent {
    pub roll: u8,
    pub runs_scored: u32,
    pub is_wicket: bool,
    pub batter_name: String,
}

/// Read-only picture of the session for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub innings: u8,
    pub phase: &'static str,
    pub batting_team: String,
    pub bowling_team: String,
    pub runs: u32,
    pub wickets: u32,
    pub overs: String,
    pub current_run_rate: f64,
    pub target: Option<u32>,
    pub runs_needed: Option<u32>,
    pub balls_left: u32,
    pub required_run_rate: Option<f64>,
    pub striker: Option<String>,
    pub non_striker: Option<String>,
    pub bowler: Option<String>,
    pub eligible_batters: Vec<String>,
    pub eligible_bowlers: Vec<String>,
    pub feed: Vec<BallEvent>,
}

#[derive(Debug, Clone)]
pub struct MatchSession {
    home: Lineup,
    away: Lineup,
    rules: ArenaRules,
    innings: u8,
    phase: Phase,
    card: InningsCard,
    memory: RollMemory,
    last_bowler: Option<PlayerId>,
    first_innings: Option<InningsCard>,
    feed: VecDeque<BallEvent>,
    result: Option<MatchResult>,
}

impl MatchSession {
    /// Home bats first
    pub fn new(home: Lineup, away: Lineup, rules: ArenaRules) -> MatchSession {
        let card = InningsCard::for_lineups(&home, &away);
        MatchSession {
            home,
            away,
            rules,
            innings: 1,
            phase: Phase::fresh(),
            card,
            memory: RollMemory::default(),
            last_bowler: None,
            first_innings: None,
            feed: VecDeque::with_capacity(rules.feed_length),
            result: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn innings(&self) -> u8 {
        self.innings
    }

    pub fn card(&self) -> &InningsCard {
        &self.card
    }

    pub fn first_innings(&self) -> Option<&InningsCard> {
        self.first_innings.as_ref()
    }

    pub fn batting(&self) -> &Lineup {
        if self.innings == 1 {
            &self.home
        } else {
            &self.away
        }
    }

    pub fn bowling(&self) -> &Lineup {
        if self.innings == 1 {
            &self.away
        } else {
            &self.home
        }
    }

    pub fn home(&self) -> &Lineup {
        &self.home
    }

    pub fn away(&self) -> &Lineup {
        &self.away
    }

    /// Runs the chasing side needs, in the second innings only
    pub fn target(&self) -> Option<u32> {
        self.first_innings.as_ref().map(|c| c.runs + 1)
    }

    /// Most recent first
    pub fn feed(&self) -> impl Iterator<Item = &BallEvent> {
        self.feed.iter()
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    /// Hand over the finished result. Yields it once; later calls get None.
    pub fn take_result(&mut self) -> Option<MatchResult> {
        self.result.take()
    }

    /// Batters who are not out and not already at the crease
    pub fn eligible_batters(&self) -> Vec<PlayerId> {
        if !self.phase.awaiting_batter() {
            return Vec::new();
        }
        let at_crease = [self.phase.striker(), self.phase.non_striker()];
        self.batting()
            .ids()
            .filter(|&id| !self.card.batter(id).is_out && !at_crease.contains(&Some(id)))
            .collect()
    }

    /// Bowlers under the cap who did not bowl the previous over
    pub fn eligible_bowlers(&self) -> Vec<PlayerId> {
        self.bowling()
            .ids()
            .filter(|&id| self.bowler_eligible(id))
            .collect()
    }

    fn bowler_eligible(&self, id: PlayerId) -> bool {
        id.index() < self.card.bowling.len()
            && self.card.bowler(id).balls < self.rules.over_cap_balls
            && self.last_bowler != Some(id)
    }

    /// Fill the next open batting slot: striker first, then non-striker
    pub fn select_batter(&mut self, id: PlayerId) -> Result<(), Refused> {
        if !self.phase.awaiting_batter() {
            return Err(Refused::WrongPhase);
        }
        if !self.eligible_batters().contains(&id) {
            return Err(Refused::Ineligible);
        }

        match self.phase {
            Phase::AwaitingStriker { non_striker: None, bowler } => {
                self.phase = Phase::AwaitingNonStriker { striker: id, bowler };
            }
            Phase::AwaitingStriker { non_striker: Some(non_striker), bowler } => {
                self.batters_ready(Crease { striker: id, non_striker }, bowler);
            }
            Phase::AwaitingNonStriker { striker, bowler } => {
                self.batters_ready(Crease { striker, non_striker: id }, bowler);
            }
            _ => return Err(Refused::WrongPhase),
        }

        tracing::debug!(
            batter = %self.batting().name(id),
            phase = self.phase.label(),
            "batter selected"
        );
        Ok(())
    }

    pub fn select_bowler(&mut self, id: PlayerId) -> Result<(), Refused> {
        let crease = match self.phase {
            Phase::AwaitingBowler { crease } => crease,
            _ => return Err(Refused::WrongPhase),
        };
        if !self.bowler_eligible(id) {
            return Err(Refused::Ineligible);
        }

        self.last_bowler = Some(id);
        self.phase = Phase::ReadyToRoll { crease, bowler: id };
        tracing::debug!(bowler = %self.bowling().name(id), "bowler selected");
        Ok(())
    }

    pub fn select_batter_by_name(&mut self, name: &str) -> Result<(), Refused> {
        let id = self.batting().id_of(name).ok_or(Refused::Ineligible)?;
        self.select_batter(id)
    }

    pub fn select_bowler_by_name(&mut self, name: &str) -> Result<(), Refused> {
        let id = self.bowling().id_of(name).ok_or(Refused::Ineligible)?;
        self.select_bowler(id)
    }

    /// Bowl one ball. Ignored (no roll drawn) unless the session is ready.
    pub fn roll<D: Dice>(&mut self, dice: &mut D) -> Option<BallEvent> {
        let (mut crease, bowler) = match self.phase {
            Phase::ReadyToRoll { crease, bowler } => (crease, bowler),
            _ => return None,
        };

        let delivery = self.memory.bowl(dice.roll());
        self.card.record(crease.striker, bowler, delivery);

        let event = BallEvent {
            roll: delivery.roll,
            runs_scored: delivery.runs,
            is_wicket: delivery.is_wicket,
            batter_name: self.batting().name(crease.striker).to_string(),
        };
        self.feed.push_front(event.clone());
        self.feed.truncate(self.rules.feed_length);

        if self.innings_over() {
            self.end_innings();
            return Some(event);
        }

        let over_end = ball::completes_over(self.card.balls);
        match (delivery.is_wicket, over_end) {
            (true, false) => {
                self.phase = Phase::AwaitingStriker {
                    non_striker: Some(crease.non_striker),
                    bowler: Some(bowler),
                };
            }
            (true, true) => {
                // the end-of-over swap leaves neither slot settled: pick both again
                self.phase = Phase::AwaitingStriker {
                    non_striker: None,
                    bowler: None,
                };
            }
            (false, _) => {
                crease.rotate(false, delivery.crossed(), over_end);
                if over_end {
                    self.await_bowler(crease);
                } else {
                    self.phase = Phase::ReadyToRoll { crease, bowler };
                }
            }
        }

        Some(event)
    }

    /// Leave the innings break and open the chase. Only valid during the break.
    pub fn start_second_innings(&mut self) -> bool {
        if self.phase != Phase::InningsBreak {
            return false;
        }
        self.innings = 2;
        self.card = InningsCard::for_lineups(&self.away, &self.home);
        self.memory = RollMemory::default();
        self.last_bowler = None;
        self.feed.clear();
        self.phase = Phase::fresh();
        tracing::debug!(target_runs = ?self.target(), "second innings started");
        true
    }

    pub fn view(&self) -> SessionView {
        let batting = self.batting();
        let bowling = self.bowling();
        let name = |lineup: &Lineup, id: Option<PlayerId>| id.map(|id| lineup.name(id).to_string());

        let target = if self.innings == 2 { self.target() } else { None };
        let balls_left = INNINGS_BALLS.saturating_sub(self.card.balls);
        let runs_needed = target.map(|t| t.saturating_sub(self.card.runs));
        let required_run_rate = match runs_needed {
            Some(need) if balls_left > 0 => Some(ball::run_rate(need, balls_left)),
            _ => None,
        };

        let eligible_bowlers = if matches!(self.phase, Phase::AwaitingBowler { .. }) {
            self.eligible_bowlers()
        } else {
            Vec::new()
        };

        SessionView {
            innings: self.innings,
            phase: self.phase.label(),
            batting_team: batting.team.clone(),
            bowling_team: bowling.team.clone(),
            runs: self.card.runs,
            wickets: self.card.wickets,
            overs: ball::overs_label(self.card.balls),
            current_run_rate: self.card.run_rate(),
            target,
            runs_needed,
            balls_left,
            required_run_rate,
            striker: name(batting, self.phase.striker()),
            non_striker: name(batting, self.phase.non_striker()),
            bowler: name(bowling, self.phase.bowler()),
            eligible_batters: self
                .eligible_batters()
                .into_iter()
                .map(|id| batting.name(id).to_string())
                .collect(),
            eligible_bowlers: eligible_bowlers
                .into_iter()
                .map(|id| bowling.name(id).to_string())
                .collect(),
            feed: self.feed.iter().cloned().collect(),
        }
    }

    fn batters_ready(&mut self, crease: Crease, bowler: Option<PlayerId>) {
        match bowler {
            Some(bowler) => self.phase = Phase::ReadyToRoll { crease, bowler },
            None => self.await_bowler(crease),
        }
    }

    fn await_bowler(&mut self, crease: Crease) {
        self.phase = Phase::AwaitingBowler { crease };
        // only reachable with short ad-hoc lineups: an XI always has a spare bowler
        if self.eligible_bowlers().is_empty() {
            tracing::warn!(team = %self.bowling().team, "no eligible bowler left, closing innings");
            self.end_innings();
        }
    }

    fn innings_over(&self) -> bool {
        let all_out = self.card.wickets >= self.batting().all_out_at();
        let balls_up = self.card.balls >= INNINGS_BALLS;
        let target_met = matches!(self.target(), Some(t) if self.innings == 2 && self.card.runs >= t);
        all_out || balls_up || target_met
    }

    fn end_innings(&mut self) {
        if self.innings == 1 {
            tracing::info!(
                team = %self.home.team,
                runs = self.card.runs,
                wickets = self.card.wickets,
                overs = %ball::overs_label(self.card.balls),
                "first innings closed"
            );
            self.first_innings = Some(self.card.clone());
            self.phase = Phase::InningsBreak;
        } else {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let first = match self.first_innings.as_ref() {
            Some(card) => card,
            None => return,
        };
        let target = first.runs + 1;
        let chase = self.card.runs;
        let winner = if chase >= target {
            Outcome::Won(self.away.team.clone())
        } else if chase < target - 1 {
            Outcome::Won(self.home.team.clone())
        } else {
            Outcome::Tied
        };

        let result = MatchResult::from_cards(&self.home, &self.away, first, &self.card, winner);
        tracing::info!(
            home = %self.home.team,
            away = %self.away.team,
            winner = %result.winner,
            "arena match finished"
        );
        self.result = Some(result);
        self.phase = Phase::Finished;
    }
}
