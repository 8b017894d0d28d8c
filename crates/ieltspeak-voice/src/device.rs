//! Single-owner audio device.
//!
//! [`AudioDevice`] wraps an [`AudioBackend`] and is the only place that
//! decides what the microphone and speaker are doing:
//!
//! ```text
//!   playback:  (none) → Loaded → Playing → Stopped ─┐
//!                 ▲                                 │ play(other) unloads first
//!                 └─────────────────────────────────┘
//!   capture:   closed → open (RecordingSession) → closed
//! ```
//!
//! Operations are serialized by an async lock. Completion callbacks come from
//! backend threads and only touch the shared state when their clip is still
//! the loaded one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ieltspeak_core::{HandleId, PlaybackHandle, PlaybackState};
use tokio::sync::oneshot;

use crate::audio_io::{AudioBackend, PermissionStatus};
use crate::error::VoiceError;
use crate::gate::SpeakerGate;

static NEXT_RECORDING_ID: AtomicU64 = AtomicU64::new(1);

/// Device behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioDeviceConfig {
    /// Allow a recording and a playing clip to overlap.
    pub duplex: bool,
}

/// How a clip's playback ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// Played to the end.
    Finished,
    /// Stopped, replaced by another clip, or released.
    Interrupted,
}

/// An open microphone capture. Consumed by stop or abort.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordingSession {
    id: u64,
}

impl RecordingSession {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// Resolves once when the clip it was created for stops playing.
#[derive(Debug)]
pub struct PlaybackCompletion {
    handle: HandleId,
    rx: oneshot::Receiver<PlaybackEnd>,
}

impl PlaybackCompletion {
    #[must_use]
    pub const fn handle_id(&self) -> HandleId {
        self.handle
    }

    /// Wait for the clip to end. A dropped device counts as an interruption.
    pub async fn wait(self) -> PlaybackEnd {
        self.rx.await.unwrap_or(PlaybackEnd::Interrupted)
    }
}

/// Result of [`AudioDevice::toggle`].
#[derive(Debug)]
pub enum ToggleOutcome {
    /// The requested clip started; any previous clip was unloaded.
    Started(PlaybackCompletion),
    /// The requested clip was the one playing and is now stopped.
    Stopped,
}

struct LoadedClip {
    handle: PlaybackHandle,
    state: PlaybackState,
    generation: u64,
    done_tx: Option<oneshot::Sender<PlaybackEnd>>,
}

impl LoadedClip {
    fn finish(&mut self, end: PlaybackEnd) {
        if let Some(tx) = self.done_tx.take() {
            let _ = tx.send(end);
        }
    }
}

#[derive(Default)]
struct DeviceState {
    permission_granted: bool,
    loaded: Option<LoadedClip>,
    recording: Option<u64>,
    generation: u64,
}

/// The one owner of the microphone and speaker for a session.
pub struct AudioDevice {
    backend: Arc<dyn AudioBackend>,
    config: AudioDeviceConfig,
    gate: SpeakerGate,
    state: Arc<Mutex<DeviceState>>,
    op_lock: tokio::sync::Mutex<()>,
}

impl AudioDevice {
    /// Wrap a backend. `gate` is raised while a clip plays; share it with the
    /// backend's capture path to drop samples during playback.
    pub fn new(backend: Arc<dyn AudioBackend>, config: AudioDeviceConfig, gate: SpeakerGate) -> Self {
        Self {
            backend,
            config,
            gate,
            state: Arc::new(Mutex::new(DeviceState::default())),
            op_lock: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> AudioDeviceConfig {
        self.config
    }

    #[must_use]
    pub const fn gate(&self) -> &SpeakerGate {
        &self.gate
    }

    fn lock_state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Permission ─────────────────────────────────────────────────

    /// Ask for microphone permission. A grant is cached for the device's
    /// lifetime; a denial is not, so the next call prompts again.
    pub async fn acquire_microphone_permission(&self) -> Result<PermissionStatus, VoiceError> {
        let _op = self.op_lock.lock().await;

        if self.lock_state().permission_granted {
            return Ok(PermissionStatus::Granted);
        }

        let status = self.backend.request_microphone_permission().await?;
        match status {
            PermissionStatus::Granted => {
                self.lock_state().permission_granted = true;
                tracing::info!("Microphone permission granted");
            }
            PermissionStatus::Denied => tracing::warn!("Microphone permission denied"),
        }
        Ok(status)
    }

    // ── Recording ──────────────────────────────────────────────────

    /// Open the microphone.
    ///
    /// Fails with [`VoiceError::DeviceBusy`] if a recording is already open and
    /// with [`VoiceError::MicrophonePermissionDenied`] if permission was not
    /// granted beforehand. Without duplex, a loaded clip is stopped and
    /// unloaded first.
    pub async fn start_recording(&self) -> Result<RecordingSession, VoiceError> {
        let _op = self.op_lock.lock().await;

        {
            let state = self.lock_state();
            if state.recording.is_some() {
                return Err(VoiceError::DeviceBusy);
            }
            if !state.permission_granted {
                return Err(VoiceError::MicrophonePermissionDenied);
            }
        }

        if !self.config.duplex {
            self.unload_current().await?;
        }

        if let Err(e) = self.backend.start_capture().await {
            if matches!(e, VoiceError::MicrophonePermissionDenied) {
                // Revoked since it was granted
                self.lock_state().permission_granted = false;
            }
            return Err(e);
        }

        let session = RecordingSession {
            id: NEXT_RECORDING_ID.fetch_add(1, Ordering::Relaxed),
        };
        self.lock_state().recording = Some(session.id);
        tracing::debug!(recording = session.id, "Recording started");
        Ok(session)
    }

    /// Close the microphone and wrap the captured audio in a playback handle.
    ///
    /// Fails with [`VoiceError::NoAudio`] when nothing was captured. The
    /// recording is closed either way.
    pub async fn stop_recording(
        &self,
        session: RecordingSession,
    ) -> Result<PlaybackHandle, VoiceError> {
        let _op = self.op_lock.lock().await;

        {
            let mut state = self.lock_state();
            if state.recording != Some(session.id) {
                return Err(VoiceError::NoActiveRecording);
            }
            state.recording = None;
        }

        let captured = self.backend.stop_capture().await?;
        if captured.data.is_empty() {
            tracing::debug!(recording = session.id, "Recording stopped with no audio");
            return Err(VoiceError::NoAudio);
        }

        let handle = PlaybackHandle::new(captured.format, captured.data);
        tracing::debug!(
            recording = session.id,
            handle = %handle.id(),
            bytes = handle.len(),
            "Recording stopped"
        );
        Ok(handle)
    }

    /// Close the microphone and discard the capture.
    pub async fn abort_recording(&self, session: RecordingSession) -> Result<(), VoiceError> {
        let _op = self.op_lock.lock().await;

        {
            let mut state = self.lock_state();
            if state.recording != Some(session.id) {
                return Err(VoiceError::NoActiveRecording);
            }
            state.recording = None;
        }

        self.backend.abort_capture().await
    }

    // ── Playback ───────────────────────────────────────────────────

    /// Play a clip, unloading whatever was loaded before.
    pub async fn play(&self, handle: &PlaybackHandle) -> Result<PlaybackCompletion, VoiceError> {
        let _op = self.op_lock.lock().await;
        self.play_locked(handle).await
    }

    /// Stop `handle` if it is the playing clip; otherwise do nothing.
    pub async fn stop(&self, handle: &PlaybackHandle) -> Result<(), VoiceError> {
        let _op = self.op_lock.lock().await;
        self.stop_locked(handle.id()).await.map(|_| ())
    }

    /// Stop `handle` if it is playing, otherwise switch playback to it.
    pub async fn toggle(&self, handle: &PlaybackHandle) -> Result<ToggleOutcome, VoiceError> {
        let _op = self.op_lock.lock().await;
        if self.stop_locked(handle.id()).await? {
            return Ok(ToggleOutcome::Stopped);
        }
        self.play_locked(handle).await.map(ToggleOutcome::Started)
    }

    async fn play_locked(&self, handle: &PlaybackHandle) -> Result<PlaybackCompletion, VoiceError> {
        if !self.config.duplex && self.lock_state().recording.is_some() {
            return Err(VoiceError::DeviceBusy);
        }

        self.unload_current().await?;
        self.backend.load(handle).await?;

        let (done_tx, done_rx) = oneshot::channel();
        let generation = {
            let mut state = self.lock_state();
            state.generation += 1;
            state.loaded = Some(LoadedClip {
                handle: handle.clone(),
                // Marked playing before the backend starts so an instant
                // completion callback finds it
                state: PlaybackState::Playing,
                generation: state.generation,
                done_tx: Some(done_tx),
            });
            state.generation
        };
        self.gate.raise();

        let on_complete = {
            let state = Arc::clone(&self.state);
            let gate = self.gate.clone();
            Box::new(move || {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(clip) = state.loaded.as_mut() {
                    if clip.generation == generation && clip.state == PlaybackState::Playing {
                        clip.state = PlaybackState::Stopped;
                        clip.finish(PlaybackEnd::Finished);
                        gate.lower();
                        tracing::debug!(handle = %clip.handle.id(), "Playback finished");
                    }
                }
            })
        };

        if let Err(e) = self.backend.play(on_complete).await {
            self.lock_state().loaded = None;
            self.gate.lower();
            if let Err(unload_err) = self.backend.unload().await {
                tracing::debug!(error = %unload_err, "Unload after failed play");
            }
            return Err(e);
        }

        tracing::debug!(handle = %handle.id(), format = ?handle.format(), "Playback started");
        Ok(PlaybackCompletion {
            handle: handle.id(),
            rx: done_rx,
        })
    }

    /// Returns true if `id` was playing and is now stopped.
    async fn stop_locked(&self, id: HandleId) -> Result<bool, VoiceError> {
        let playing = self.lock_state().loaded.as_ref().is_some_and(|clip| {
            clip.handle.id() == id && clip.state == PlaybackState::Playing
        });
        if !playing {
            return Ok(false);
        }

        self.backend.stop_playback().await?;

        if let Some(clip) = self.lock_state().loaded.as_mut() {
            clip.state = PlaybackState::Stopped;
            clip.finish(PlaybackEnd::Interrupted);
        }
        self.gate.lower();
        tracing::debug!(handle = %id, "Playback stopped");
        Ok(true)
    }

    /// Stop and unload the loaded clip, if any.
    ///
    /// The clip is forgotten and the gate lowered even when the backend
    /// fails; the first backend error is returned after cleanup.
    async fn unload_current(&self) -> Result<(), VoiceError> {
        let Some(mut clip) = self.lock_state().loaded.take() else {
            return Ok(());
        };

        let mut first_error = None;
        if clip.state == PlaybackState::Playing {
            if let Err(e) = self.backend.stop_playback().await {
                tracing::warn!(handle = %clip.handle.id(), error = %e, "Stop playback before unload failed");
                first_error = Some(e);
            }
        }
        if let Err(e) = self.backend.unload().await {
            tracing::warn!(handle = %clip.handle.id(), error = %e, "Unload failed");
            first_error.get_or_insert(e);
        }
        clip.finish(PlaybackEnd::Interrupted);
        self.gate.lower();

        match first_error {
            Some(e) => Err(e),
            None => {
                tracing::debug!(handle = %clip.handle.id(), "Clip unloaded");
                Ok(())
            }
        }
    }

    // ── Teardown ───────────────────────────────────────────────────

    /// Abort any open recording and unload any clip. Never fails; errors
    /// from resources that are already gone are ignored.
    pub async fn release(&self) {
        let _op = self.op_lock.lock().await;

        let (recording, clip) = {
            let mut state = self.lock_state();
            (state.recording.take(), state.loaded.take())
        };

        if let Some(recording) = recording {
            if let Err(e) = self.backend.abort_capture().await {
                tracing::debug!(recording, error = %e, "Abort capture during release");
            }
        }

        if let Some(mut clip) = clip {
            if clip.state == PlaybackState::Playing {
                if let Err(e) = self.backend.stop_playback().await {
                    tracing::debug!(error = %e, "Stop playback during release");
                }
            }
            if let Err(e) = self.backend.unload().await {
                tracing::debug!(error = %e, "Unload during release");
            }
            clip.finish(PlaybackEnd::Interrupted);
        }

        self.gate.lower();
        tracing::debug!("Audio device released");
    }

    // ── Queries ────────────────────────────────────────────────────

    /// The clip currently playing, if any.
    #[must_use]
    pub fn active_handle(&self) -> Option<PlaybackHandle> {
        self.lock_state()
            .loaded
            .as_ref()
            .filter(|clip| clip.state == PlaybackState::Playing)
            .map(|clip| clip.handle.clone())
    }

    /// Lifecycle state of `handle`, or `None` if it is not loaded.
    #[must_use]
    pub fn playback_state(&self, handle: &PlaybackHandle) -> Option<PlaybackState> {
        self.lock_state()
            .loaded
            .as_ref()
            .filter(|clip| clip.handle.id() == handle.id())
            .map(|clip| clip.state)
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.lock_state().recording.is_some()
    }

    /// No recording open and no clip loaded.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let state = self.lock_state();
        state.recording.is_none() && state.loaded.is_none()
    }
}

impl std::fmt::Debug for AudioDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("AudioDevice")
            .field("config", &self.config)
            .field("recording", &state.recording)
            .field("loaded", &state.loaded.as_ref().map(|clip| (clip.handle.id(), clip.state)))
            .finish_non_exhaustive()
    }
}
