pub mod arena;
pub mod ball;
pub mod config;
pub mod dice;
pub mod error;
pub mod innings;
pub mod lineup;
pub mod result;
pub mod roster;
pub mod schedule;
pub mod scorecard;
pub mod season;
pub mod session;
pub mod standings;
pub mod store;
pub mod tournament;

pub use error::{LeagueError, Result};
