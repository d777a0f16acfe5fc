//! Named, owned timer handles.
//!
//! Each timer is a tokio task that posts [`TimerEvent`]s into the session's
//! event channel. A slot holds at most one handle; replacing or clearing the
//! slot aborts the task. Events carry the ticket of the handle that produced
//! them, so an event that was already queued when its timer was cancelled can
//! be recognised and dropped.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Periodic clock tick.
    Clock,
    /// One-shot end of the engine's thinking delay.
    Thinking,
    /// Periodic progress bar update.
    Progress,
    /// One-shot delay before the objective signal.
    Settle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub kind: TimerKind,
    pub ticket: u64,
}

/// Owns one timer task. Dropping the handle aborts the task.
#[derive(Debug)]
pub struct TimerHandle {
    ticket: u64,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug)]
pub struct Timers {
    tx: mpsc::UnboundedSender<TimerEvent>,
    next_ticket: u64,
    clock: Option<TimerHandle>,
    thinking: Option<TimerHandle>,
    progress: Option<TimerHandle>,
    settle: Option<TimerHandle>,
}

impl Timers {
    pub fn new(tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Timers {
            tx,
            next_ticket: 0,
            clock: None,
            thinking: None,
            progress: None,
            settle: None,
        }
    }

    fn slot(&self, kind: TimerKind) -> &Option<TimerHandle> {
        match kind {
            TimerKind::Clock => &self.clock,
            TimerKind::Thinking => &self.thinking,
            TimerKind::Progress => &self.progress,
            TimerKind::Settle => &self.settle,
        }
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<TimerHandle> {
        match kind {
            TimerKind::Clock => &mut self.clock,
            TimerKind::Thinking => &mut self.thinking,
            TimerKind::Progress => &mut self.progress,
            TimerKind::Settle => &mut self.settle,
        }
    }

    fn issue(&mut self, kind: TimerKind) -> TimerEvent {
        self.next_ticket += 1;
        TimerEvent {
            kind,
            ticket: self.next_ticket,
        }
    }

    /// Fires `kind` every `period`, first after one full period. Replaces any
    /// timer already in the slot.
    pub fn start_interval(&mut self, kind: TimerKind, period: Duration) -> u64 {
        let event = self.issue(kind);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(event).is_err() {
                    break;
                }
            }
        });
        tracing::trace!(?kind, ticket = event.ticket, ?period, "interval started");
        *self.slot_mut(kind) = Some(TimerHandle {
            ticket: event.ticket,
            task,
        });
        event.ticket
    }

    /// Fires `kind` once after `delay`. Replaces any timer already in the
    /// slot.
    pub fn start_once(&mut self, kind: TimerKind, delay: Duration) -> u64 {
        let event = self.issue(kind);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = tx.send(event);
        });
        tracing::trace!(?kind, ticket = event.ticket, ?delay, "one-shot started");
        *self.slot_mut(kind) = Some(TimerHandle {
            ticket: event.ticket,
            task,
        });
        event.ticket
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if self.slot_mut(kind).take().is_some() {
            tracing::trace!(?kind, "timer cancelled");
        }
    }

    pub fn cancel_all(&mut self) {
        for kind in [
            TimerKind::Clock,
            TimerKind::Thinking,
            TimerKind::Progress,
            TimerKind::Settle,
        ] {
            self.cancel(kind);
        }
    }

    /// Whether `event` came from the handle currently in its slot.
    pub fn is_live(&self, event: &TimerEvent) -> bool {
        self.slot(event.kind)
            .as_ref()
            .is_some_and(|h| h.ticket == event.ticket)
    }

    pub fn is_running(&self, kind: TimerKind) -> bool {
        self.slot(kind).is_some()
    }

    /// Ticket of the timer currently in `kind`'s slot.
    pub fn ticket(&self, kind: TimerKind) -> Option<u64> {
        self.slot(kind).as_ref().map(TimerHandle::ticket)
    }
}
