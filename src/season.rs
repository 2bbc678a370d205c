// Auto-simulation of tournament fixtures.
// Every match draws from its own ChaCha8 stream, picked by sequence number, so a
// season replays identically from the same master seed however rayon schedules it.
// Innings are simulated in parallel; results are folded into the table one at a
// time in sequence order.

use crate::config::SeasonSettings;
use crate::dice::{Dice, RngDice};
use crate::error::{LeagueError, Result};
use crate::innings::{self, PlayedMatch};
use crate::lineup::Lineup;
use crate::result::MatchResult;
use crate::store::TournamentStore;
use crate::tournament::Tournament;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Dice for one fixture of a seeded season
pub fn match_dice(seed: u64, sequence: u32) -> RngDice<ChaCha8Rng> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(sequence as u64);
    RngDice::new(rng)
}

/// A simulated fixture with its lineups, ready to print or record
#[derive(Debug, Clone)]
pub struct SimulatedFixture {
    pub sequence: u32,
    pub home: Lineup,
    pub away: Lineup,
    pub played: PlayedMatch,
}

impl SimulatedFixture {
    pub fn result(&self) -> &MatchResult {
        &self.played.result
    }

    pub fn print_scorecards(&self) {
        self.played.first.pretty_print(&self.home, &self.away);
        self.played.second.pretty_print(&self.away, &self.home);
    }
}

/// Simulate and record the next fixture with both sides' default XIs
pub fn play_next<D: Dice>(tournament: &mut Tournament, dice: &mut D) -> Result<SimulatedFixture> {
    let sequence = tournament
        .next_fixture()
        .map(|m| m.sequence_number)
        .ok_or(LeagueError::TournamentCompleted)?;
    let (home, away) = tournament.default_lineups(sequence)?;
    let played = innings::play_match(&home, &away, dice);
    tournament.record_result(sequence, &home, &away, played.result.clone())?;
    Ok(SimulatedFixture { sequence, home, away, played })
}

/// Simulate every unplayed fixture from `seed` and record them in order.
/// Returns the number of matches played.
pub fn simulate_remaining(tournament: &mut Tournament, seed: u64) -> Result<usize> {
    let results = simulate_pending(tournament, seed, &ProgressBar::hidden())?;
    record_in_order(tournament, seed, results, |_| Ok(()))
}

type Simulated = (u32, Lineup, Lineup, MatchResult);

fn simulate_pending(tournament: &Tournament, seed: u64, progress: &ProgressBar) -> Result<Vec<Simulated>> {
    let jobs: Vec<(u32, Lineup, Lineup)> = tournament
        .pending()
        .map(|m| tournament.default_lineups(m.sequence_number).map(|(home, away)| (m.sequence_number, home, away)))
        .collect::<Result<_>>()?;

    progress.set_length(jobs.len() as u64);
    let results = jobs
        .into_par_iter()
        .map(|(seq, home, away)| {
            let mut dice = match_dice(seed, seq);
            let result = innings::simulate_match(&home, &away, &mut dice);
            progress.inc(1);
            (seq, home, away, result)
        })
        .collect();
    progress.finish_and_clear();
    Ok(results)
}

/// Record results one at a time, calling `after_each` once each match is in
fn record_in_order<F>(tournament: &mut Tournament, seed: u64, results: Vec<Simulated>, mut after_each: F) -> Result<usize>
where
    F: FnMut(&Tournament) -> Result<()>,
{
    let played = results.len();
    for (seq, home, away, result) in results {
        tournament.record_result(seq, &home, &away, result)?;
        after_each(tournament)?;
    }

    tracing::info!(tournament = %tournament.name, seed, played, "season simulated");
    Ok(played)
}

/// What a season run did, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonReport {
    pub seed: u64,
    pub played: usize,
}

/// Simulate the rest of the season using the configured seed, thread count and progress bar.
/// The tournament is saved to `store` after every recorded match.
pub fn run_season<S>(tournament: &mut Tournament, settings: &SeasonSettings, store: &S) -> Result<SeasonReport>
where
    S: TournamentStore + ?Sized,
{
    let seed = settings.seed.unwrap_or_else(|| rand::thread_rng().gen());
    if settings.seed.is_none() {
        tracing::info!(seed, "no seed configured, drew one");
    }

    let progress = if settings.progress {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} matches")
                .progress_chars("=> "),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.threads)
        .build()
        .map_err(|e| LeagueError::Config(format!("failed to build thread pool: {}", e)))?;
    let results = pool.install(|| simulate_pending(tournament, seed, &progress))?;
    let played = record_in_order(tournament, seed, results, |t| store.save(t))?;

    Ok(SeasonReport { seed, played })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::store::JsonFileStore;
    use crate::tournament::tests::league;
    use crate::tournament::Status;
    use std::cell::RefCell;

    #[test]
    fn test_play_next_records_first_fixture() {
        let mut t = league(&["A", "B", "C"]);
        let mut dice = match_dice(1, 1);
        let fixture = play_next(&mut t, &mut dice).unwrap();
        assert_eq!(fixture.sequence, 1);
        assert!(t.fixture(1).unwrap().is_completed);
        assert_eq!(t.next_fixture().unwrap().sequence_number, 2);
        assert_eq!(fixture.played.first.runs, fixture.result().home_score);
    }

    #[test]
    fn test_play_next_when_done() {
        let mut t = league(&["A", "B"]);
        let mut dice = ScriptedDice::cycle(&[1, 2, 3], 480);
        play_next(&mut t, &mut dice).unwrap();
        play_next(&mut t, &mut dice).unwrap();
        assert!(matches!(play_next(&mut t, &mut dice), Err(LeagueError::TournamentCompleted)));
    }

    #[test]
    fn test_simulate_remaining_completes_season() {
        let mut t = league(&["A", "B", "C", "D"]);
        let played = simulate_remaining(&mut t, 99).unwrap();
        assert_eq!(played, 12);
        assert_eq!(t.status, Status::Completed);

        let total_played: u32 = t.teams.iter().map(|team| team.record.played).sum();
        assert_eq!(total_played, 24);
        let nrr_sum: f64 = t.teams.iter().map(|team| team.record.net_run_rate).sum();
        assert!(nrr_sum.abs() < 1e-9);
        for team in &t.teams {
            let r = &team.record;
            assert_eq!(r.played, 6);
            assert_eq!(r.won + r.lost + r.tied, r.played);
            assert_eq!(r.points, 2 * r.won + r.tied);
        }
    }

    #[test]
    fn test_same_seed_same_season() {
        let mut a = league(&["A", "B", "C", "D"]);
        let mut b = a.clone();
        simulate_remaining(&mut a, 2024).unwrap();
        simulate_remaining(&mut b, 2024).unwrap();
        assert_eq!(a.matches, b.matches);
        assert_eq!(a.teams, b.teams);
    }

    #[test]
    fn test_fixture_streams_differ() {
        let mut one = match_dice(7, 1);
        let mut two = match_dice(7, 2);
        let a: Vec<u8> = (0..50).map(|_| one.roll()).collect();
        let b: Vec<u8> = (0..50).map(|_| two.roll()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_only_pending_fixtures_simulated() {
        let mut t = league(&["A", "B", "C"]);
        play_next(&mut t, &mut match_dice(3, 1)).unwrap();
        let before = t.fixture(1).unwrap().clone();
        let played = simulate_remaining(&mut t, 3).unwrap();
        assert_eq!(played, 5);
        assert_eq!(t.fixture(1).unwrap(), &before);
    }

    /// Remembers how many matches were complete at each save
    #[derive(Default)]
    struct CountingStore {
        saves: RefCell<Vec<usize>>,
    }

    impl TournamentStore for CountingStore {
        fn save(&self, tournament: &Tournament) -> Result<()> {
            self.saves.borrow_mut().push(tournament.completed_count());
            Ok(())
        }

        fn load(&self, slug: &str) -> Result<Tournament> {
            Err(LeagueError::TournamentNotFound(slug.to_string()))
        }
    }

    #[test]
    fn test_run_season_uses_configured_seed() {
        let mut t = league(&["A", "B"]);
        let settings = SeasonSettings { seed: Some(11), threads: 2, progress: false };
        let report = run_season(&mut t, &settings, &CountingStore::default()).unwrap();
        assert_eq!(report, SeasonReport { seed: 11, played: 2 });
    }

    #[test]
    fn test_run_season_saves_after_each_match() {
        let mut t = league(&["A", "B", "C"]);
        play_next(&mut t, &mut match_dice(4, 1)).unwrap();
        let store = CountingStore::default();
        let settings = SeasonSettings { seed: Some(4), threads: 1, progress: false };
        run_season(&mut t, &settings, &store).unwrap();
        assert_eq!(*store.saves.borrow(), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_run_season_saves_to_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        let mut t = league(&["A", "B"]);
        let settings = SeasonSettings { seed: Some(8), threads: 1, progress: false };
        run_season(&mut t, &settings, &store).unwrap();
        assert_eq!(store.load("test-cup").unwrap(), t);
    }
}
