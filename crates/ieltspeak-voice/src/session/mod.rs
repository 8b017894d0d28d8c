//! Practice-session controller.
//!
//! The controller runs as a tokio task that owns the [`AudioDevice`], the
//! conversation log and the question deck. [`SessionHandle`] sends it
//! commands; results come back per command, and everything that happens is
//! also published as [`SessionEvent`]s and as a [`SessionSnapshot`].
//!
//! Dropping the handle tears the session down and releases the device.

mod actor;
mod config;
mod events;
mod state;

use std::sync::Arc;

use ieltspeak_core::{QuestionSource, SpeechSynthesizer, Turn, TurnId};
use tokio::sync::{mpsc, oneshot, watch};

use crate::device::AudioDevice;
use crate::error::SessionError;

use actor::{CancelSlot, Command};

pub use actor::{NO_QUESTION_TEXT, ReplayOutcome, SessionController};
pub use config::SessionConfig;
pub use events::{NoticeKind, SessionEvent, SessionNotice, SessionSnapshot};
pub use state::SessionState;

/// Commands queued beyond this wait for the actor to catch up.
const COMMAND_QUEUE: usize = 16;

impl SessionController {
    /// Start a session actor on the current tokio runtime.
    ///
    /// The session starts `Idle`; call [`SessionHandle::begin`] to ask the
    /// first question.
    pub fn spawn(
        config: SessionConfig,
        source: Arc<dyn QuestionSource>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        device: AudioDevice,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
        let cancel = CancelSlot::default();

        let (controller, wakeups) = Self::new(
            config,
            source,
            synthesizer,
            device,
            cancel.clone(),
            event_tx,
            snapshot_tx,
        );
        tokio::spawn(controller.run(command_rx, wakeups));

        let handle = SessionHandle {
            commands: command_tx,
            cancel,
            snapshot: snapshot_rx,
        };
        (handle, event_rx)
    }
}

/// Caller-side handle to a running session.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    cancel: CancelSlot,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Fetch the questions and ask the first one.
    ///
    /// A failed fetch is surfaced as a notice and still succeeds: the session
    /// shows a placeholder question and waits for an answer or a refetch.
    pub async fn begin(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Begin { reply }).await
    }

    /// Press-in: open the microphone. Interrupts a question that is still
    /// playing.
    pub async fn start_answering(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::StartAnswering { reply }).await
    }

    /// Press-out: close the microphone and log the answer.
    pub async fn stop_answering(&self) -> Result<TurnId, SessionError> {
        self.request(|reply| Command::StopAnswering { reply }).await
    }

    /// Play a turn's audio, or stop it if it is the one playing.
    pub async fn replay(&self, turn: TurnId) -> Result<ReplayOutcome, SessionError> {
        self.request(|reply| Command::Replay { turn, reply }).await
    }

    /// Fetch the questions again and restart from the first one.
    pub async fn refetch(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Refetch { reply }).await
    }

    /// End the session: cancel pending work, release the device, clear the log.
    ///
    /// Idempotent, and succeeds even if the actor has already stopped.
    pub async fn teardown(&self) -> Result<(), SessionError> {
        self.cancel.cancel_and_renew();
        match self.request(|reply| Command::Teardown { reply }).await {
            Err(SessionError::Closed) | Ok(()) => Ok(()),
            Err(e) => Err(e),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().state
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// The conversation log in display order.
    #[must_use]
    pub fn turns(&self) -> Vec<Turn> {
        self.snapshot.borrow().turns.clone()
    }

    /// A receiver that sees every snapshot update.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, SessionError>>) -> Command,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        // The actor notices the closed channel and tears down
        self.cancel.cancel();
    }
}
