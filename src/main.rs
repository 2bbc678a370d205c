use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cricket_league::arena::{ArenaRules, MatchSession, SessionView};
use cricket_league::config::{self, Config};
use cricket_league::dice::RngDice;
use cricket_league::error::LeagueError;
use cricket_league::lineup::Lineup;
use cricket_league::roster;
use cricket_league::season;
use cricket_league::session::{SessionHandle, SessionTimings};
use cricket_league::standings;
use cricket_league::store::{JsonFileStore, TournamentStore};
use cricket_league::tournament::Tournament;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Parser)]
#[command(name = "cricket-league")]
#[command(about = "Schedule a cricket league and play its matches with dice", long_about = None)]
struct Cli {
    /// YAML config file (defaults to league.yaml if present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Directory holding tournament files
    #[arg(long, global = true, default_value = "leagues")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a tournament from a roster file and generate its fixtures
    New {
        #[arg(long)]
        name: String,

        /// Roster file (.json or .csv)
        #[arg(long)]
        roster: PathBuf,

        /// Seed for the fixture shuffle
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List fixtures and results
    Fixtures { slug: String },

    /// Auto-simulate the next fixture and print the scorecard
    Next { slug: String },

    /// Auto-simulate every remaining fixture
    Season {
        slug: String,

        /// Master seed (overrides season.seed in the config)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the points table
    Table { slug: String },

    /// Play the next fixture interactively
    Arena { slug: String },

    /// Print a sample configuration file
    SampleConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::SampleConfig = cli.command {
        print!("{}", config::generate_sample_config());
        return Ok(());
    }

    let store = JsonFileStore::new(&cli.data_dir)
        .with_context(|| format!("cannot open data directory {}", cli.data_dir.display()))?;

    match cli.command {
        Commands::New { name, roster, seed } => {
            let rosters = roster::load_rosters(&roster)
                .with_context(|| format!("failed to load rosters from {}", roster.display()))?;
            let mut rng = match seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let tournament = Tournament::create(&name, rosters, &mut rng)?;
            store.save(&tournament)?;
            println!(
                "Created '{}' ({} teams, {} matches) as {}",
                tournament.name,
                tournament.teams.len(),
                tournament.matches.len(),
                tournament.slug()
            );
        }
        Commands::Fixtures { slug } => {
            let tournament = store.load(&slug)?;
            print_fixtures(&tournament);
        }
        Commands::Next { slug } => {
            let mut tournament = store.load(&slug)?;
            let fixture = season::play_next(&mut tournament, &mut RngDice::thread())?;
            store.save(&tournament)?;

            let m = tournament.fixture(fixture.sequence)?;
            println!("{}", m.label());
            println!();
            fixture.print_scorecards();
            println!("{}", fixture.result().summary(&m.home_team, &m.away_team));
        }
        Commands::Season { slug, seed } => {
            let mut tournament = store.load(&slug)?;
            let mut settings = config.season.clone();
            if seed.is_some() {
                settings.seed = seed;
            }
            let report = season::run_season(&mut tournament, &settings, &store)?;
            println!("Simulated {} matches (seed {})", report.played, report.seed);
            println!();
            standings::print_table(&tournament.points_table());
        }
        Commands::Table { slug } => {
            let tournament = store.load(&slug)?;
            println!(
                "{} ({} of {} matches played)",
                tournament.name,
                tournament.completed_count(),
                tournament.matches.len()
            );
            println!();
            standings::print_table(&tournament.points_table());
        }
        Commands::Arena { slug } => {
            let mut tournament = store.load(&slug)?;
            play_arena(&mut tournament, &store, &config).await?;
        }
        Commands::SampleConfig => {}
    }

    Ok(())
}

fn print_fixtures(tournament: &Tournament) {
    for m in &tournament.matches {
        match &m.winner {
            Some(winner) if m.is_completed => println!(
                "{:>3}. {} {}/{} v {} {}/{}: {}",
                m.sequence_number,
                m.home_team,
                m.home_score,
                m.home_wickets,
                m.away_team,
                m.away_score,
                m.away_wickets,
                winner
            ),
            _ => println!("{:>3}. {} v {}", m.sequence_number, m.home_team, m.away_team),
        }
    }
}

async fn play_arena(tournament: &mut Tournament, store: &JsonFileStore, config: &Config) -> Result<()> {
    let sequence = tournament
        .next_fixture()
        .map(|m| m.sequence_number)
        .ok_or(LeagueError::TournamentCompleted)?;
    let (home, away) = tournament.default_lineups(sequence)?;
    println!("{}", tournament.fixture(sequence)?.label());
    print_role_summary(tournament, &home)?;
    print_role_summary(tournament, &away)?;
    println!("Pick players by number, 'r' to roll, 'q' to abandon.");
    println!();

    let rules: ArenaRules = config.arena.rules();
    let session = MatchSession::new(home.clone(), away.clone(), rules);
    let dice = RngDice::new(ChaCha8Rng::from_entropy());
    let mut handle = SessionHandle::spawn(session, dice, SessionTimings::from(&config.arena));
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut announced_break = false;

    loop {
        let view = handle.view().await?;
        match view.phase {
            "InningsBreak" => {
                if !announced_break {
                    println!("End of innings: {} {}/{} ({} ov)", view.batting_team, view.runs, view.wickets, view.overs);
                    println!("Innings break...");
                    announced_break = true;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            "Finished" => {
                print_view(&view);
                println!("Match over. Recording result...");
                break;
            }
            _ => {
                print_view(&view);
                if !take_turn(&handle, &view, &mut input).await? {
                    handle.abort();
                    println!("Match abandoned; nothing recorded.");
                    return Ok(());
                }
            }
        }
    }

    let result = handle.wait_result().await?;
    let session = handle.shutdown().await?;
    if let Some(first) = session.first_innings() {
        first.pretty_print(&home, &away);
    }
    session.card().pretty_print(&away, &home);

    let summary = result.summary(&home.team, &away.team);
    tournament.record_result(sequence, &home, &away, result)?;
    store.save(tournament)?;
    println!("{}", summary);
    println!();
    standings::print_table(&tournament.points_table());
    Ok(())
}

fn print_role_summary(tournament: &Tournament, lineup: &Lineup) -> Result<()> {
    let roster = &tournament.team(&lineup.team)?.roster;
    let s = lineup.role_summary(roster);
    println!(
        "{}: {} batters, {} bowlers, {} all-rounders",
        lineup.team, s.batters, s.bowlers, s.all_rounders
    );
    Ok(())
}

fn print_view(view: &SessionView) {
    println!(
        "[Innings {}] {} {}/{} ({} ov, CRR {:.2})",
        view.innings, view.batting_team, view.runs, view.wickets, view.overs, view.current_run_rate
    );
    if let (Some(target), Some(need)) = (view.target, view.runs_needed) {
        match view.required_run_rate {
            Some(rrr) => println!(
                "Target {}: need {} off {} balls (RRR {:.2})",
                target, need, view.balls_left, rrr
            ),
            None => println!("Target {}", target),
        }
    }
    if let Some(last) = view.feed.first() {
        let outcome = if last.is_wicket {
            "WICKET".to_string()
        } else {
            format!("{} run(s)", last.runs_scored)
        };
        println!("Last ball: rolled {}, {} to {}", last.roll, outcome, last.batter_name);
    }
}

/// One prompt and one action. Returns false when the user quits.
async fn take_turn(handle: &SessionHandle, view: &SessionView, input: &mut Lines<BufReader<Stdin>>) -> Result<bool> {
    let choices = match view.phase {
        "AwaitingStriker" => Some(("striker", &view.eligible_batters)),
        "AwaitingNonStriker" => Some(("non-striker", &view.eligible_batters)),
        "AwaitingBowler" => Some(("bowler", &view.eligible_bowlers)),
        _ => None,
    };

    if let Some((slot, names)) = choices {
        println!("Choose {} for {}:", slot, if slot == "bowler" { &view.bowling_team } else { &view.batting_team });
        for (i, name) in names.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, name);
        }
    } else {
        let on_strike = view.striker.as_deref().unwrap_or("?");
        let bowler = view.bowler.as_deref().unwrap_or("?");
        println!("{} to {}: press Enter or 'r' to roll", bowler, on_strike);
    }

    let line = match input.next_line().await.context("failed to read input")? {
        Some(line) => line,
        None => return Ok(false),
    };
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Ok(false);
    }

    match choices {
        Some((slot, names)) => {
            let pick = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| names.get(i));
            let name = match pick {
                Some(name) => name,
                None => {
                    println!("Enter a number from 1 to {}", names.len());
                    return Ok(true);
                }
            };
            let outcome = if slot == "bowler" {
                handle.select_bowler(name).await?
            } else {
                handle.select_batter(name).await?
            };
            if let Err(refused) = outcome {
                println!("Cannot pick {}: {:?}", name, refused);
            }
        }
        None => {
            if !(line.is_empty() || line.eq_ignore_ascii_case("r")) {
                println!("Press Enter or 'r' to roll, 'q' to abandon");
                return Ok(true);
            }
            if handle.roll().await?.is_none() {
                bail!("roll refused while ready to bowl");
            }
        }
    }
    Ok(true)
}
