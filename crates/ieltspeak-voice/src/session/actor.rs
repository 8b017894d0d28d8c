//! The session actor: owns the device, the log and the question deck, and
//! processes commands one at a time.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use ieltspeak_core::{
    ConversationLog, HandleId, NewTurn, PlaybackHandle, QuestionDeck, QuestionSource,
    SpeechSynthesizer, TurnId,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::audio_io::PermissionStatus;
use crate::device::{AudioDevice, PlaybackCompletion, PlaybackEnd, RecordingSession, ToggleOutcome};
use crate::error::SessionError;

use super::config::SessionConfig;
use super::events::{NoticeKind, SessionEvent, SessionNotice, SessionSnapshot};
use super::state::SessionState;

/// Text of the AI turn appended when there is no question to ask.
pub const NO_QUESTION_TEXT: &str = "No question available for this category.";

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

/// Outcome of a replay request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// The turn's audio started playing.
    Started(HandleId),
    /// The turn's audio was playing and is now stopped.
    Stopped,
}

pub(crate) enum Command {
    Begin { reply: Reply<()> },
    StartAnswering { reply: Reply<()> },
    StopAnswering { reply: Reply<TurnId> },
    Replay { turn: TurnId, reply: Reply<ReplayOutcome> },
    Refetch { reply: Reply<()> },
    Teardown { reply: Reply<()> },
}

/// Internal re-entries into the actor. Tagged with the epoch they were
/// scheduled in; a teardown bumps the epoch and orphans them.
pub(crate) enum Wakeup {
    PlaybackEnded {
        epoch: u64,
        handle: HandleId,
        end: PlaybackEnd,
    },
    AdvanceDue {
        epoch: u64,
    },
}

/// Cancellation token shared between the handle and the actor.
///
/// The handle cancels and replaces it before queueing a teardown, so awaits
/// already in flight inside the actor return immediately.
#[derive(Debug, Clone, Default)]
pub(crate) struct CancelSlot(Arc<Mutex<CancellationToken>>);

impl CancelSlot {
    pub(crate) fn current(&self) -> CancellationToken {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn cancel_and_renew(&self) {
        let old = std::mem::replace(
            &mut *self.0.lock().unwrap_or_else(PoisonError::into_inner),
            CancellationToken::new(),
        );
        old.cancel();
    }

    pub(crate) fn cancel(&self) {
        self.current().cancel();
    }
}

async fn cancellable<T>(
    token: CancellationToken,
    fut: impl Future<Output = T>,
) -> Result<T, SessionError> {
    tokio::select! {
        () = token.cancelled() => Err(SessionError::Cancelled),
        value = fut => Ok(value),
    }
}

/// Drives one practice session. Create it with [`SessionController::spawn`].
pub struct SessionController {
    config: SessionConfig,
    source: Arc<dyn QuestionSource>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    device: AudioDevice,

    state: SessionState,
    log: ConversationLog,
    deck: Option<QuestionDeck>,
    cursor: usize,
    epoch: u64,
    recording: Option<RecordingSession>,
    /// Clip of the question currently being asked.
    question_clip: Option<PlaybackHandle>,
    /// Audio synthesized on demand for text-only AI turns.
    replay_clips: HashMap<TurnId, PlaybackHandle>,
    pending_advance: Option<JoinHandle<()>>,

    cancel: CancelSlot,
    events: mpsc::UnboundedSender<SessionEvent>,
    snapshot: watch::Sender<SessionSnapshot>,
    wake_tx: mpsc::UnboundedSender<Wakeup>,
}

impl SessionController {
    pub(crate) fn new(
        config: SessionConfig,
        source: Arc<dyn QuestionSource>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        device: AudioDevice,
        cancel: CancelSlot,
        events: mpsc::UnboundedSender<SessionEvent>,
        snapshot: watch::Sender<SessionSnapshot>,
    ) -> (Self, mpsc::UnboundedReceiver<Wakeup>) {
        let (wake_tx, wake_rx) = mpsc::unbounded_channel();
        let controller = Self {
            config,
            source,
            synthesizer,
            device,
            state: SessionState::Idle,
            log: ConversationLog::new(),
            deck: None,
            cursor: 0,
            epoch: 0,
            recording: None,
            question_clip: None,
            replay_clips: HashMap::new(),
            pending_advance: None,
            cancel,
            events,
            snapshot,
            wake_tx,
        };
        (controller, wake_rx)
    }

    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut wakeups: mpsc::UnboundedReceiver<Wakeup>,
    ) {
        tracing::debug!(selection = %self.config.selection, "Session actor started");
        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        // Every handle is gone
                        self.teardown().await;
                        break;
                    }
                },
                Some(wakeup) = wakeups.recv() => self.handle_wakeup(wakeup).await,
            }
        }
        tracing::debug!("Session actor stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Begin { reply } => {
                let _ = reply.send(self.begin().await);
            }
            Command::StartAnswering { reply } => {
                let _ = reply.send(self.start_answering().await);
            }
            Command::StopAnswering { reply } => {
                let _ = reply.send(self.stop_answering().await);
            }
            Command::Replay { turn, reply } => {
                let _ = reply.send(self.replay(turn).await);
            }
            Command::Refetch { reply } => {
                let _ = reply.send(self.refetch().await);
            }
            Command::Teardown { reply } => {
                self.teardown().await;
                let _ = reply.send(Ok(()));
            }
        }
    }

    async fn handle_wakeup(&mut self, wakeup: Wakeup) {
        match wakeup {
            Wakeup::PlaybackEnded { epoch, .. } | Wakeup::AdvanceDue { epoch }
                if epoch != self.epoch =>
            {
                tracing::debug!(epoch, current = self.epoch, "Ignoring stale wake-up");
            }
            Wakeup::PlaybackEnded { handle, end, .. } => {
                self.emit(SessionEvent::PlaybackFinished { handle, end });
                let was_question = self
                    .question_clip
                    .as_ref()
                    .is_some_and(|clip| clip.id() == handle);
                if was_question {
                    self.question_clip = None;
                    if self.state == SessionState::AskingQuestion {
                        self.set_state(SessionState::AwaitingAnswer);
                    }
                }
            }
            Wakeup::AdvanceDue { .. } => {
                self.pending_advance = None;
                if self.state != SessionState::Advancing {
                    return;
                }
                self.cursor = self
                    .deck
                    .as_ref()
                    .map_or(0, |deck| deck.advance(self.cursor));
                tracing::debug!(cursor = self.cursor, "Advancing to next question");
                if let Err(e) = self.ask_current().await {
                    tracing::debug!(error = %e, "Advance interrupted");
                }
            }
        }
    }

    // ── Actions ────────────────────────────────────────────────────

    async fn begin(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(self.reject(SessionError::AlreadyActive));
        }

        tracing::info!(selection = %self.config.selection, "Practice session starting");
        self.set_state(SessionState::AskingQuestion);
        match self.load_deck().await {
            Err(SessionError::Cancelled) => return Err(SessionError::Cancelled),
            // Already surfaced; the placeholder turn keeps the session usable
            Err(_) | Ok(()) => {}
        }
        self.cursor = 0;
        self.ask_current().await
    }

    async fn start_answering(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::AwaitingAnswer => {}
            SessionState::AskingQuestion => {
                // Barge-in: cut the question short
                if let Some(clip) = self.question_clip.take() {
                    if let Err(e) = self.device.stop(&clip).await {
                        return Err(self.reject(e.into()));
                    }
                }
                self.set_state(SessionState::AwaitingAnswer);
            }
            SessionState::Recording => return Err(self.reject(SessionError::DeviceBusy)),
            state @ (SessionState::Idle | SessionState::Advancing) => {
                return Err(self.reject(SessionError::NotReady { state }));
            }
        }

        let permission = cancellable(
            self.cancel.current(),
            self.device.acquire_microphone_permission(),
        )
        .await?;
        match permission {
            Ok(PermissionStatus::Granted) => {}
            Ok(PermissionStatus::Denied) => return Err(self.reject(SessionError::Permission)),
            Err(e) => return Err(self.reject(e.into())),
        }

        match self.device.start_recording().await {
            Ok(session) => {
                self.recording = Some(session);
                self.set_state(SessionState::Recording);
                Ok(())
            }
            Err(e) => Err(self.reject(e.into())),
        }
    }

    async fn stop_answering(&mut self) -> Result<TurnId, SessionError> {
        let session = match (self.state, self.recording.take()) {
            (SessionState::Recording, Some(session)) => session,
            (state, _) => return Err(SessionError::NotReady { state }),
        };

        match self.device.stop_recording(session).await {
            Ok(recording) => {
                let id = self.append_turn(NewTurn::user(recording));
                self.set_state(SessionState::Advancing);
                self.schedule_advance();
                Ok(id)
            }
            Err(e) => {
                self.set_state(SessionState::AwaitingAnswer);
                Err(self.reject(e.into()))
            }
        }
    }

    async fn replay(&mut self, turn: TurnId) -> Result<ReplayOutcome, SessionError> {
        let Some(found) = self.log.get(turn) else {
            return Err(self.reject(SessionError::TurnNotFound(turn)));
        };

        let existing = found
            .playable()
            .or_else(|| self.replay_clips.get(&turn))
            .cloned();
        let text = found.text().unwrap_or_default().to_string();

        let clip = match existing {
            Some(clip) => clip,
            None => {
                let synthesized =
                    cancellable(self.cancel.current(), self.synthesizer.synthesize(&text)).await?;
                match synthesized {
                    Ok(clip) => {
                        self.replay_clips.insert(turn, clip.clone());
                        clip
                    }
                    Err(e) => return Err(self.reject(e.into())),
                }
            }
        };

        match self.device.toggle(&clip).await {
            Ok(ToggleOutcome::Started(completion)) => {
                self.watch_playback(completion, Some(turn));
                Ok(ReplayOutcome::Started(clip.id()))
            }
            Ok(ToggleOutcome::Stopped) => Ok(ReplayOutcome::Stopped),
            Err(e) => Err(self.reject(e.into())),
        }
    }

    async fn refetch(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::AwaitingAnswer {
            let state = self.state;
            return Err(self.reject(SessionError::NotReady { state }));
        }

        self.set_state(SessionState::AskingQuestion);
        let fetched = self.load_deck().await;
        if matches!(fetched, Err(SessionError::Cancelled)) {
            return fetched;
        }
        self.cursor = 0;
        self.ask_current().await?;
        fetched
    }

    async fn teardown(&mut self) {
        if let Some(task) = self.pending_advance.take() {
            task.abort();
        }
        self.recording = None;
        self.device.release().await;

        self.epoch += 1;
        self.log.clear();
        self.deck = None;
        self.cursor = 0;
        self.question_clip = None;
        self.replay_clips.clear();

        if self.state == SessionState::Idle {
            self.publish();
        } else {
            tracing::info!("Practice session torn down");
            self.set_state(SessionState::Idle);
        }
    }

    // ── Transitions ────────────────────────────────────────────────

    /// Fetch the deck for the configured selection. A fetch failure leaves no
    /// deck and is surfaced as a notice.
    async fn load_deck(&mut self) -> Result<(), SessionError> {
        let selection = self.config.selection;
        let fetched =
            cancellable(self.cancel.current(), self.source.fetch_selection(selection)).await?;

        match fetched {
            Ok(deck) => {
                tracing::info!(%selection, questions = deck.len(), "Question deck loaded");
                if deck.is_empty() {
                    self.notify(NoticeKind::Fetch, "no questions available");
                }
                self.deck = Some(deck);
                self.publish();
                Ok(())
            }
            Err(e) => {
                self.deck = None;
                self.publish();
                Err(self.reject(e.into()))
            }
        }
    }

    /// Ask the question at the cursor: synthesize, log, play.
    async fn ask_current(&mut self) -> Result<(), SessionError> {
        self.set_state(SessionState::AskingQuestion);

        let question = self
            .deck
            .as_ref()
            .and_then(|deck| deck.next(self.cursor).ok())
            .filter(|question| !question.is_blank())
            .map(|question| question.content.clone());

        let Some(text) = question else {
            if self.deck.as_ref().is_some_and(|deck| !deck.is_empty()) {
                tracing::warn!(cursor = self.cursor, "Question has no content");
            }
            self.append_turn(NewTurn::ai(NO_QUESTION_TEXT, None));
            self.set_state(SessionState::AwaitingAnswer);
            return Ok(());
        };

        let synthesized =
            cancellable(self.cancel.current(), self.synthesizer.synthesize(&text)).await?;

        let clip = match synthesized {
            Ok(clip) => clip,
            Err(e) => {
                // Text-only: the question is still shown
                self.append_turn(NewTurn::ai(text, None));
                self.reject(e.into());
                self.set_state(SessionState::AwaitingAnswer);
                return Ok(());
            }
        };

        let turn = self.append_turn(NewTurn::ai(text, Some(clip.clone())));
        match self.device.play(&clip).await {
            Ok(completion) => {
                self.question_clip = Some(clip);
                self.watch_playback(completion, Some(turn));
            }
            Err(e) => {
                self.reject(e.into());
                self.set_state(SessionState::AwaitingAnswer);
            }
        }
        Ok(())
    }

    fn schedule_advance(&mut self) {
        let epoch = self.epoch;
        let delay = self.config.advance_delay;
        let wake_tx = self.wake_tx.clone();
        self.pending_advance = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = wake_tx.send(Wakeup::AdvanceDue { epoch });
        }));
    }

    fn watch_playback(&self, completion: PlaybackCompletion, turn: Option<TurnId>) {
        let handle = completion.handle_id();
        self.emit(SessionEvent::PlaybackStarted { handle, turn });

        let epoch = self.epoch;
        let wake_tx = self.wake_tx.clone();
        tokio::spawn(async move {
            let end = completion.wait().await;
            let _ = wake_tx.send(Wakeup::PlaybackEnded { epoch, handle, end });
        });
    }

    // ── Publishing ─────────────────────────────────────────────────

    fn append_turn(&mut self, turn: NewTurn) -> TurnId {
        let appended = self.log.append(turn).clone();
        let id = appended.id();
        self.emit(SessionEvent::TurnAppended(appended));
        self.publish();
        id
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        tracing::debug!(from = %self.state, to = %state, "Session state changed");
        self.state = state;
        self.emit(SessionEvent::StateChanged(state));
        self.publish();
    }

    /// Surface `err` as a notice and hand it back for returning.
    fn reject(&self, err: SessionError) -> SessionError {
        if let Some(kind) = NoticeKind::for_error(&err) {
            tracing::warn!(state = %self.state, error = %err, "Session action failed");
            self.notify(kind, err.to_string());
        }
        err
    }

    fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        self.emit(SessionEvent::Notice(SessionNotice {
            kind,
            message: message.into(),
        }));
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    fn publish(&self) {
        self.snapshot.send_replace(SessionSnapshot {
            state: self.state,
            cursor: self.cursor,
            deck_len: self.deck.as_ref().map_or(0, QuestionDeck::len),
            turns: self.log.all().to_vec(),
        });
    }
}
