// Configuration module for the cricket league
// Supports YAML configuration files for arena timing, season simulation and logging

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::arena::ArenaRules;
use crate::error::{LeagueError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub arena: ArenaSettings,
    #[serde(default)]
    pub season: SeasonSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

pub const DEFAULT_PATHS: [&str; 3] = ["league.yaml", "league.yml", ".cricket-league.yaml"];

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(LeagueError::Config(format!("config file not found: {}", path)));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| LeagueError::Config(format!("failed to read config file: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| LeagueError::Config(format!("failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file if it exists, otherwise use defaults.
    /// Runs before logging is set up, so problems go to stderr.
    pub fn load_or_default(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::from_file(p).unwrap_or_else(|e| {
                eprintln!("Warning: {}", e);
                eprintln!("Using default configuration.");
                Self::default()
            }),
            None => {
                for default_path in &DEFAULT_PATHS {
                    if Path::new(default_path).exists() {
                        match Self::from_file(default_path) {
                            Ok(config) => return config,
                            Err(e) => eprintln!("Warning: {}", e),
                        }
                    }
                }
                Self::default()
            }
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| LeagueError::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.arena.over_cap_balls == 0 {
            return Err(LeagueError::Config("arena.over_cap_balls must be at least 1".to_string()));
        }
        if self.arena.feed_length == 0 {
            return Err(LeagueError::Config("arena.feed_length must be at least 1".to_string()));
        }
        if self.season.threads == 0 {
            return Err(LeagueError::Config("season.threads must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Interactive match settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSettings {
    /// Pause between the end of the first innings and the start of the chase
    #[serde(default = "default_innings_break_ms")]
    pub innings_break_ms: u64,

    /// Pause between the final ball and handing over the result
    #[serde(default = "default_result_delay_ms")]
    pub result_delay_ms: u64,

    /// Ball events kept in the live feed
    #[serde(default = "default_feed_length")]
    pub feed_length: usize,

    /// Balls one bowler may deliver in an innings
    #[serde(default = "default_over_cap_balls")]
    pub over_cap_balls: u32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        ArenaSettings {
            innings_break_ms: default_innings_break_ms(),
            result_delay_ms: default_result_delay_ms(),
            feed_length: default_feed_length(),
            over_cap_balls: default_over_cap_balls(),
        }
    }
}

impl ArenaSettings {
    pub fn rules(&self) -> ArenaRules {
        ArenaRules {
            over_cap_balls: self.over_cap_balls,
            feed_length: self.feed_length,
        }
    }

    pub fn innings_break(&self) -> Duration {
        Duration::from_millis(self.innings_break_ms)
    }

    pub fn result_delay(&self) -> Duration {
        Duration::from_millis(self.result_delay_ms)
    }
}

fn default_innings_break_ms() -> u64 { 1500 }
fn default_result_delay_ms() -> u64 { 5000 }
fn default_feed_length() -> usize { 12 }
fn default_over_cap_balls() -> u32 { 24 }

/// Auto-simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSettings {
    /// Master seed; leave unset for a fresh random season
    #[serde(default)]
    pub seed: Option<u64>,

    /// Worker threads for simulating matches
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Show a progress bar while simulating
    #[serde(default = "default_progress")]
    pub progress: bool,
}

impl Default for SeasonSettings {
    fn default() -> Self {
        SeasonSettings {
            seed: None,
            threads: default_threads(),
            progress: default_progress(),
        }
    }
}

fn default_threads() -> usize { num_cpus::get() }
fn default_progress() -> bool { true }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive, e.g. "info" or "cricket_league=debug". RUST_LOG wins if set.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings { level: default_level() }
    }
}

fn default_level() -> String { "info".to_string() }

/// Generate a sample configuration file
pub fn generate_sample_config() -> String {
    r#"# Cricket League Configuration
# All values shown are defaults - uncomment and modify as needed

# Interactive (arena) matches
arena:
  # Pause after the first innings before the chase starts (milliseconds)
  innings_break_ms: 1500
  # Pause after the last ball before the result is recorded (milliseconds)
  result_delay_ms: 5000
  # Number of recent balls shown in the live feed
  feed_length: 12
  # Balls a bowler may deliver per innings (24 = 4 overs)
  over_cap_balls: 24

# Auto-simulated seasons
season:
  # Master seed for a replayable season (omit for random)
  # seed: 42
  # Worker threads (defaults to the number of CPUs)
  # threads: 8
  # Show a progress bar
  progress: true

# Logging
logging:
  # tracing filter directive; RUST_LOG overrides this
  level: info
"#
    .to_string()
}
