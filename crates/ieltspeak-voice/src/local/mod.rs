//! Local machine audio: cpal capture and rodio playback.
//!
//! Only one [`LocalAudioBackend`] may be open per process; the microphone and
//! speaker are not shared between sessions.

mod audio_thread;
mod capture;
mod playback;
mod wav;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ieltspeak_core::PlaybackHandle;

use crate::audio_io::{AudioBackend, CapturedAudio, PermissionStatus, PlaybackDoneCallback};
use crate::error::VoiceError;
use crate::gate::SpeakerGate;

use audio_thread::AudioThreadHandle;

pub use capture::RECORDING_SAMPLE_RATE;
pub use wav::encode_wav;

static LOCAL_BACKEND_OPEN: AtomicBool = AtomicBool::new(false);

/// [`AudioBackend`] for the machine's default input and output devices.
pub struct LocalAudioBackend {
    thread: AudioThreadHandle,
}

impl LocalAudioBackend {
    /// Open the default devices on a dedicated audio thread.
    ///
    /// `gate` must be the same gate the [`AudioDevice`](crate::AudioDevice)
    /// raises, so capture drops samples while a clip plays. Fails with
    /// [`VoiceError::DeviceBusy`] if another local backend is open.
    pub fn open(gate: SpeakerGate) -> Result<Self, VoiceError> {
        if LOCAL_BACKEND_OPEN
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(VoiceError::DeviceBusy);
        }

        match AudioThreadHandle::spawn(gate) {
            Ok(thread) => Ok(Self { thread }),
            Err(e) => {
                LOCAL_BACKEND_OPEN.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }
}

impl Drop for LocalAudioBackend {
    fn drop(&mut self) {
        LOCAL_BACKEND_OPEN.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl AudioBackend for LocalAudioBackend {
    async fn request_microphone_permission(&self) -> Result<PermissionStatus, VoiceError> {
        self.thread.request_permission().await
    }

    async fn start_capture(&self) -> Result<(), VoiceError> {
        self.thread.start_capture().await
    }

    async fn stop_capture(&self) -> Result<CapturedAudio, VoiceError> {
        self.thread.stop_capture().await
    }

    async fn abort_capture(&self) -> Result<(), VoiceError> {
        self.thread.abort_capture().await
    }

    async fn load(&self, handle: &PlaybackHandle) -> Result<(), VoiceError> {
        self.thread.load(handle.shared_bytes(), handle.format()).await
    }

    async fn play(&self, on_complete: PlaybackDoneCallback) -> Result<(), VoiceError> {
        self.thread.play(on_complete).await
    }

    async fn stop_playback(&self) -> Result<(), VoiceError> {
        self.thread.stop_playback().await
    }

    async fn unload(&self) -> Result<(), VoiceError> {
        self.thread.unload().await
    }
}
