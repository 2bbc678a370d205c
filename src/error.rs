// Error types for the league boundary: roster loading, lineup validation,
// tournament bookkeeping, storage and configuration.
// The match engine itself never raises; see arena.rs for how it treats bad input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("roster error: {0}")]
    Roster(String),

    #[error("invalid lineup for {team}: {reason}")]
    InvalidLineup { team: String, reason: String },

    #[error("team not found: {0}")]
    TeamNotFound(String),

    #[error("match {0} not found")]
    MatchNotFound(u32),

    #[error("match {0} has already been played")]
    MatchAlreadyPlayed(u32),

    #[error("tournament completed")]
    TournamentCompleted,

    #[error("tournament not found: {0}")]
    TournamentNotFound(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("session closed")]
    SessionClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, LeagueError>;
