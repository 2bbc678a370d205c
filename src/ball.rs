// The dice rules for a single delivery, shared by the auto simulator and the arena.
//
// roll 1, 4, 6 -> that many runs
// roll 2, 3    -> dot ball, never a wicket
// roll 5       -> dot ball, unless the previous roll was also a 5: then it is a wicket
//
// The previous-roll memory survives over boundaries and is wiped by a wicket.

use serde::{Deserialize, Serialize};

pub const BALLS_PER_OVER: u32 = 6;
pub const INNINGS_OVERS: u32 = 20;
pub const INNINGS_BALLS: u32 = BALLS_PER_OVER * INNINGS_OVERS;

#[inline]
pub fn is_wicket(roll: u8, previous: Option<u8>) -> bool {
    roll == 5 && previous == Some(5)
}

#[inline]
pub fn runs_for(roll: u8, wicket: bool) -> u32 {
    match roll {
        1 | 4 | 6 if !wicket => roll as u32,
        _ => 0,
    }
}

/// Outcome of one ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub roll: u8,
    pub runs: u32,
    pub is_wicket: bool,
}

impl Delivery {
    pub fn is_four(&self) -> bool {
        self.runs == 4
    }

    pub fn is_six(&self) -> bool {
        self.runs == 6
    }

    /// Odd runs mean the batters crossed
    pub fn crossed(&self) -> bool {
        !self.is_wicket && self.runs % 2 == 1
    }
}

/// Remembers the last roll so a pair of 5s can be spotted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollMemory {
    previous: Option<u8>,
}

impl RollMemory {
    pub fn previous(&self) -> Option<u8> {
        self.previous
    }

    pub fn bowl(&mut self, roll: u8) -> Delivery {
        let wicket = is_wicket(roll, self.previous);
        self.previous = if wicket { None } else { Some(roll) };
        Delivery {
            roll,
            runs: runs_for(roll, wicket),
            is_wicket: wicket,
        }
    }
}

/// True when the ball just bowled (the `balls`-th of the innings) ends an over
#[inline]
pub fn completes_over(balls: u32) -> bool {
    balls > 0 && balls % BALLS_PER_OVER == 0
}

/// Overs in the scoreboard convention: 14 balls is 2.2, not 2.333
pub fn overs_display(balls: u32) -> f64 {
    (balls / BALLS_PER_OVER) as f64 + (balls % BALLS_PER_OVER) as f64 / 10.0
}

pub fn overs_label(balls: u32) -> String {
    format!("{}.{}", balls / BALLS_PER_OVER, balls % BALLS_PER_OVER)
}

/// Runs per six balls; 0.0 before the first ball
pub fn run_rate(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        0.0
    } else {
        runs as f64 / balls as f64 * BALLS_PER_OVER as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_table() {
        assert_eq!(runs_for(1, false), 1);
        assert_eq!(runs_for(2, false), 0);
        assert_eq!(runs_for(3, false), 0);
        assert_eq!(runs_for(4, false), 4);
        assert_eq!(runs_for(5, false), 0);
        assert_eq!(runs_for(6, false), 6);
        assert_eq!(runs_for(5, true), 0);
    }

    #[test]
    fn test_wicket_needs_two_fives() {
        assert!(!is_wicket(5, None));
        assert!(!is_wicket(5, Some(4)));
        assert!(is_wicket(5, Some(5)));
        for roll in [1, 2, 3, 4, 6] {
            assert!(!is_wicket(roll, Some(5)));
        }
    }

    #[test]
    fn test_memory_clears_after_wicket() {
        let mut memory = RollMemory::default();
        assert!(!memory.bowl(5).is_wicket);
        assert!(memory.bowl(5).is_wicket);
        assert_eq!(memory.previous(), None);
        // a third 5 starts a fresh pair
        assert!(!memory.bowl(5).is_wicket);
        assert!(memory.bowl(5).is_wicket);
    }

    #[test]
    fn test_memory_tracks_every_roll() {
        let mut memory = RollMemory::default();
        memory.bowl(5);
        memory.bowl(2);
        assert!(!memory.bowl(5).is_wicket);
        assert_eq!(memory.previous(), Some(5));
    }

    #[test]
    fn test_crossing() {
        let mut memory = RollMemory::default();
        assert!(memory.bowl(1).crossed());
        assert!(!memory.bowl(4).crossed());
        assert!(!memory.bowl(6).crossed());
        assert!(!memory.bowl(3).crossed());
    }

    #[test]
    fn test_overs_display() {
        assert_eq!(overs_display(0), 0.0);
        assert_eq!(overs_display(6), 1.0);
        assert!((overs_display(28) - 4.4).abs() < 1e-12);
        assert_eq!(overs_display(120), 20.0);
        assert_eq!(overs_label(94), "15.4");
        assert!(completes_over(6));
        assert!(!completes_over(0));
        assert!(!completes_over(7));
    }

    #[test]
    fn test_run_rate() {
        assert_eq!(run_rate(10, 0), 0.0);
        assert!((run_rate(30, 18) - 10.0).abs() < 1e-12);
    }
}
