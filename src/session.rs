// Runs an arena match as a tokio task that owns the MatchSession.
//
// Callers talk to it through a SessionHandle; every action goes down one channel and
// is applied in arrival order, so two actions never touch the session at once.
// The innings break and the pause before the result is handed over are deadlines
// raced against the abort token: once aborted, neither the chase nor the result
// delivery happens.

use crate::arena::{BallEvent, MatchSession, Phase, Refused, SessionView};
use crate::config::ArenaSettings;
use crate::dice::Dice;
use crate::error::{LeagueError, Result};
use crate::result::MatchResult;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

const COMMAND_BUFFER: usize = 16;

/// Reply to a player pick
pub type Selection = std::result::Result<(), Refused>;

#[derive(Debug)]
pub enum SessionCommand {
    SelectBatter {
        name: String,
        reply: oneshot::Sender<Selection>,
    },
    SelectBowler {
        name: String,
        reply: oneshot::Sender<Selection>,
    },
    Roll {
        reply: oneshot::Sender<Option<BallEvent>>,
    },
    View {
        reply: oneshot::Sender<SessionView>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    pub innings_break: Duration,
    pub result_delay: Duration,
}

impl From<&ArenaSettings> for SessionTimings {
    fn from(settings: &ArenaSettings) -> Self {
        SessionTimings {
            innings_break: settings.innings_break(),
            result_delay: settings.result_delay(),
        }
    }
}

impl Default for SessionTimings {
    fn default() -> Self {
        SessionTimings::from(&ArenaSettings::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    StartChase,
    DeliverResult,
}

pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    cancel: CancellationToken,
    result: Option<oneshot::Receiver<MatchResult>>,
    task: JoinHandle<MatchSession>,
}

impl SessionHandle {
    /// Start the session task. Must be called inside a tokio runtime.
    pub fn spawn<D>(session: MatchSession, dice: D, timings: SessionTimings) -> SessionHandle
    where
        D: Dice + Send + 'static,
    {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let (result_tx, result_rx) = oneshot::channel();
        let cancel = CancellationToken::new();

        tracing::debug!(
            home = %session.home().team,
            away = %session.away().team,
            "arena session started"
        );
        let task = tokio::spawn(run(session, dice, timings, rx, cancel.clone(), result_tx));

        SessionHandle {
            commands,
            cancel,
            result: Some(result_rx),
            task,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| LeagueError::SessionClosed)?;
        rx.await.map_err(|_| LeagueError::SessionClosed)
    }

    pub async fn select_batter(&self, name: &str) -> Result<Selection> {
        let name = name.to_string();
        self.request(|reply| SessionCommand::SelectBatter { name, reply }).await
    }

    pub async fn select_bowler(&self, name: &str) -> Result<Selection> {
        let name = name.to_string();
        self.request(|reply| SessionCommand::SelectBowler { name, reply }).await
    }

    /// None when the session was not ready to bowl
    pub async fn roll(&self) -> Result<Option<BallEvent>> {
        self.request(|reply| SessionCommand::Roll { reply }).await
    }

    pub async fn view(&self) -> Result<SessionView> {
        self.request(|reply| SessionCommand::View { reply }).await
    }

    /// Stop the session. Pending delays are dropped without firing.
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the finished result. It is delivered once; an aborted session
    /// or a second call gets `SessionClosed`.
    pub async fn wait_result(&mut self) -> Result<MatchResult> {
        let rx = self.result.take().ok_or(LeagueError::SessionClosed)?;
        rx.await.map_err(|_| LeagueError::SessionClosed)
    }

    /// Close the command channel and get the session back
    pub async fn shutdown(self) -> Result<MatchSession> {
        drop(self.commands);
        self.task.await.map_err(|_| LeagueError::SessionClosed)
    }
}

async fn run<D: Dice>(
    mut session: MatchSession,
    mut dice: D,
    timings: SessionTimings,
    mut commands: mpsc::Receiver<SessionCommand>,
    cancel: CancellationToken,
    result_tx: oneshot::Sender<MatchResult>,
) -> MatchSession {
    let mut result_tx = Some(result_tx);
    let mut pending: Option<(Pending, Instant)> = None;

    loop {
        if pending.is_none() {
            pending = match session.phase() {
                Phase::InningsBreak => Some((Pending::StartChase, Instant::now() + timings.innings_break)),
                Phase::Finished if result_tx.is_some() => {
                    Some((Pending::DeliverResult, Instant::now() + timings.result_delay))
                }
                _ => None,
            };
        }
        let deadline = pending.map(|(_, at)| at);

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!(phase = session.phase().label(), "arena session aborted");
                break;
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                match pending.take() {
                    Some((Pending::StartChase, _)) => {
                        session.start_second_innings();
                    }
                    Some((Pending::DeliverResult, _)) => {
                        if let (Some(tx), Some(result)) = (result_tx.take(), session.take_result()) {
                            if tx.send(result).is_err() {
                                tracing::debug!("result receiver dropped before delivery");
                            }
                        }
                    }
                    None => {}
                }
            }
            command = commands.recv() => match command {
                Some(command) => apply(&mut session, &mut dice, command),
                None => break,
            },
        }
    }

    session
}

fn apply<D: Dice>(session: &mut MatchSession, dice: &mut D, command: SessionCommand) {
    // a dropped reply channel just means the caller stopped listening
    match command {
        SessionCommand::SelectBatter { name, reply } => {
            let _ = reply.send(session.select_batter_by_name(&name));
        }
        SessionCommand::SelectBowler { name, reply } => {
            let _ = reply.send(session.select_bowler_by_name(&name));
        }
        SessionCommand::Roll { reply } => {
            let _ = reply.send(session.roll(dice));
        }
        SessionCommand::View { reply } => {
            let _ = reply.send(session.view());
        }
    }
}
