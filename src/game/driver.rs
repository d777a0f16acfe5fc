//! Runs a [`Session`] as a task.
//!
//! The task owns the session and is the only thing that touches it. Callers
//! talk to it through a [`SessionHandle`]: commands go in over a channel with
//! oneshot replies, snapshots come out over a watch channel. Timer events and
//! commands are processed one at a time in arrival order.

use rand::RngCore;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::session::{MoveRejection, Session, SessionSnapshot, UnlockGate};
use super::timer::TimerEvent;
use crate::config::GameConfig;
use crate::core::{MoveRecord, MoveRequest};
use crate::logic::{RulesEngine, RulesError};

const COMMAND_BUFFER: usize = 32;

#[derive(Debug)]
pub enum Command {
    Submit {
        request: MoveRequest,
        reply: oneshot::Sender<Result<MoveRecord, MoveRejection>>,
    },
    Reset {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    SwitchSides {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    updates: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

/// Initializes a session and starts its task on the current runtime.
pub fn spawn_session<R>(
    config: GameConfig,
    rules: R,
    rng: Box<dyn RngCore + Send>,
    gate: Box<dyn UnlockGate>,
) -> Result<SessionHandle, RulesError>
where
    R: RulesEngine + Clone + Send + 'static,
{
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut session = Session::new(config, rules, rng, gate, event_tx)?;
    session.initialize();

    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (update_tx, update_rx) = watch::channel(session.snapshot());
    let task = tokio::spawn(run(session, command_rx, event_rx, update_tx));

    Ok(SessionHandle {
        commands: command_tx,
        updates: update_rx,
        task,
    })
}

async fn run<R: RulesEngine + Clone>(
    mut session: Session<R>,
    mut commands: mpsc::Receiver<Command>,
    mut events: mpsc::UnboundedReceiver<TimerEvent>,
    updates: watch::Sender<SessionSnapshot>,
) {
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Submit { request, reply }) => {
                    let result = session.submit_move(request);
                    if let Err(rejection) = &result {
                        tracing::debug!(%request, %rejection, "move rejected");
                    }
                    let _ = reply.send(result);
                }
                Some(Command::Reset { reply }) => {
                    session.reset();
                    let _ = reply.send(session.snapshot());
                }
                Some(Command::SwitchSides { reply }) => {
                    session.switch_sides();
                    let _ = reply.send(session.snapshot());
                }
                Some(Command::Snapshot { reply }) => {
                    let _ = reply.send(session.snapshot());
                }
                Some(Command::Shutdown) | None => break,
            },
            Some(event) = events.recv() => session.handle_timer(event),
        }
        let snapshot = session.snapshot();
        updates.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
    session.shutdown();
}

impl SessionHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Option<T> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(make(tx)).await.ok()?;
        rx.await.ok()
    }

    pub async fn submit(&self, request: MoveRequest) -> Result<MoveRecord, MoveRejection> {
        self.request(|reply| Command::Submit { request, reply })
            .await
            .unwrap_or(Err(MoveRejection::SessionClosed))
    }

    pub async fn reset(&self) -> anyhow::Result<SessionSnapshot> {
        self.request(|reply| Command::Reset { reply })
            .await
            .ok_or_else(|| anyhow::anyhow!("session closed"))
    }

    pub async fn switch_sides(&self) -> anyhow::Result<SessionSnapshot> {
        self.request(|reply| Command::SwitchSides { reply })
            .await
            .ok_or_else(|| anyhow::anyhow!("session closed"))
    }

    pub async fn snapshot(&self) -> anyhow::Result<SessionSnapshot> {
        self.request(|reply| Command::Snapshot { reply })
            .await
            .ok_or_else(|| anyhow::anyhow!("session closed"))
    }

    /// Receives every published snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.clone()
    }

    /// Stops the task and cancels every pending timer.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        let _ = self.commands.send(Command::Shutdown).await;
        self.task.await?;
        Ok(())
    }
}
