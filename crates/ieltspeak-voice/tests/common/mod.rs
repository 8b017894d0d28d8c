//! Shared fakes for the ieltspeak-voice integration tests.
//!
//! [`FakeAudioBackend`] records every call it receives and never touches
//! real hardware. Playback only ends when a test calls
//! [`FakeAudioBackend::finish_playback`].

// Each test binary uses a different subset of the helpers
#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use ieltspeak_core::{AudioFormat, HandleId, PlaybackHandle};
use ieltspeak_voice::{
    AudioBackend, AudioDevice, AudioDeviceConfig, CapturedAudio, PermissionStatus,
    PlaybackDoneCallback, SpeakerGate, VoiceError,
};

/// One call received by the fake, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    RequestPermission,
    StartCapture,
    StopCapture,
    AbortCapture,
    Load(HandleId),
    Play,
    StopPlayback,
    Unload,
}

struct Inner {
    calls: Vec<Call>,
    permission: PermissionStatus,
    capture: Vec<u8>,
    capturing: bool,
    loaded: Option<HandleId>,
    loaded_twice: bool,
    on_complete: Option<PlaybackDoneCallback>,
    fail_next_stop: bool,
}

pub struct FakeAudioBackend {
    inner: Mutex<Inner>,
}

impl FakeAudioBackend {
    /// Permission granted; a capture yields a few bytes of WAV.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                calls: Vec::new(),
                permission: PermissionStatus::Granted,
                capture: b"RIFF-fake-answer".to_vec(),
                capturing: false,
                loaded: None,
                loaded_twice: false,
                on_complete: None,
                fail_next_stop: false,
            }),
        })
    }

    pub fn denying_permission() -> Arc<Self> {
        let backend = Self::new();
        backend.lock().permission = PermissionStatus::Denied;
        backend
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Bytes the next capture returns. Empty means silence.
    pub fn set_capture(&self, data: Vec<u8>) {
        self.lock().capture = data;
    }

    pub fn set_permission(&self, status: PermissionStatus) {
        self.lock().permission = status;
    }

    /// The next `stop_playback` fails as if the audio thread had died.
    pub fn fail_next_stop_playback(&self) {
        self.lock().fail_next_stop = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.lock().calls.iter().filter(|c| **c == call).count()
    }

    /// Handles loaded so far, in order.
    pub fn loads(&self) -> Vec<HandleId> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Load(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn loaded(&self) -> Option<HandleId> {
        self.lock().loaded
    }

    pub fn is_capturing(&self) -> bool {
        self.lock().capturing
    }

    /// A clip was loaded while another was still loaded.
    pub fn loaded_twice(&self) -> bool {
        self.lock().loaded_twice
    }

    /// Play the current clip to its end. Returns false if nothing was playing.
    pub fn finish_playback(&self) -> bool {
        let callback = self.lock().on_complete.take();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AudioBackend for FakeAudioBackend {
    async fn request_microphone_permission(&self) -> Result<PermissionStatus, VoiceError> {
        let mut inner = self.lock();
        inner.calls.push(Call::RequestPermission);
        Ok(inner.permission)
    }

    async fn start_capture(&self) -> Result<(), VoiceError> {
        let mut inner = self.lock();
        inner.calls.push(Call::StartCapture);
        if inner.capturing {
            return Err(VoiceError::DeviceBusy);
        }
        inner.capturing = true;
        Ok(())
    }

    async fn stop_capture(&self) -> Result<CapturedAudio, VoiceError> {
        let mut inner = self.lock();
        inner.calls.push(Call::StopCapture);
        inner.capturing = false;
        Ok(CapturedAudio {
            data: inner.capture.clone(),
            format: AudioFormat::Wav,
        })
    }

    async fn abort_capture(&self) -> Result<(), VoiceError> {
        let mut inner = self.lock();
        inner.calls.push(Call::AbortCapture);
        inner.capturing = false;
        Ok(())
    }

    async fn load(&self, handle: &PlaybackHandle) -> Result<(), VoiceError> {
        let mut inner = self.lock();
        inner.calls.push(Call::Load(handle.id()));
        if inner.loaded.is_some() {
            inner.loaded_twice = true;
        }
        inner.loaded = Some(handle.id());
        Ok(())
    }

    async fn play(&self, on_complete: PlaybackDoneCallback) -> Result<(), VoiceError> {
        let mut inner = self.lock();
        inner.calls.push(Call::Play);
        inner.on_complete = Some(on_complete);
        Ok(())
    }

    async fn stop_playback(&self) -> Result<(), VoiceError> {
        let mut inner = self.lock();
        inner.calls.push(Call::StopPlayback);
        if std::mem::take(&mut inner.fail_next_stop) {
            return Err(VoiceError::AudioThreadDied);
        }
        inner.on_complete = None;
        Ok(())
    }

    async fn unload(&self) -> Result<(), VoiceError> {
        let mut inner = self.lock();
        inner.calls.push(Call::Unload);
        inner.on_complete = None;
        inner.loaded = None;
        Ok(())
    }
}

/// Half-duplex device over `backend`.
pub fn device_over(backend: &Arc<FakeAudioBackend>) -> AudioDevice {
    AudioDevice::new(
        Arc::clone(backend) as Arc<dyn AudioBackend>,
        AudioDeviceConfig::default(),
        SpeakerGate::new(),
    )
}

/// A synthesized-looking clip.
pub fn clip(tag: u8) -> PlaybackHandle {
    PlaybackHandle::new(AudioFormat::Mpeg, vec![tag; 32])
}
