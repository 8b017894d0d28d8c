//! Dedicated audio I/O thread: keeps `!Send` audio resources off the runtime.
//!
//! `cpal::Stream` and `rodio::OutputStream` are `!Send` on some platforms, so
//! both live on one OS thread for their whole life. [`AudioThreadHandle`] is
//! the `Send + Sync` proxy; each call is an [`AudioCommand`] plus a oneshot
//! reply, so callers await the thread instead of blocking a runtime worker.

use std::sync::{Arc, mpsc};
use std::thread;

use ieltspeak_core::AudioFormat;
use tokio::sync::oneshot;

use crate::audio_io::{CapturedAudio, PermissionStatus, PlaybackDoneCallback};
use crate::error::VoiceError;
use crate::gate::SpeakerGate;

use super::capture::{AudioCapture, RECORDING_SAMPLE_RATE};
use super::playback::AudioPlayback;
use super::wav::encode_wav;

type Reply<T> = oneshot::Sender<Result<T, VoiceError>>;

enum AudioCommand {
    RequestPermission { reply: Reply<PermissionStatus> },
    StartCapture { reply: Reply<()> },
    StopCapture { reply: Reply<CapturedAudio> },
    AbortCapture { reply: Reply<()> },
    Load {
        data: Arc<[u8]>,
        format: AudioFormat,
        reply: Reply<()>,
    },
    Play {
        on_done: PlaybackDoneCallback,
        reply: Reply<()>,
    },
    StopPlayback { reply: Reply<()> },
    Unload { reply: Reply<()> },
    Shutdown,
}

/// `Send + Sync` handle to the audio thread.
///
/// Calls resolve when the thread replies, which is the time of the audio
/// operation itself plus local channel latency.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the thread and open capture and playback on it.
    pub fn spawn(gate: SpeakerGate) -> Result<Self, VoiceError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), VoiceError>>();

        let thread = thread::Builder::new()
            .name("ieltspeak-audio".into())
            .spawn(move || Self::run(gate, &cmd_rx, &init_tx))
            .map_err(|e| {
                VoiceError::InputStreamError(format!("failed to spawn audio thread: {e}"))
            })?;

        init_rx.recv().map_err(|_| VoiceError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    pub async fn request_permission(&self) -> Result<PermissionStatus, VoiceError> {
        self.send_and_recv(|reply| AudioCommand::RequestPermission { reply }).await
    }

    pub async fn start_capture(&self) -> Result<(), VoiceError> {
        self.send_and_recv(|reply| AudioCommand::StartCapture { reply }).await
    }

    pub async fn stop_capture(&self) -> Result<CapturedAudio, VoiceError> {
        self.send_and_recv(|reply| AudioCommand::StopCapture { reply }).await
    }

    pub async fn abort_capture(&self) -> Result<(), VoiceError> {
        self.send_and_recv(|reply| AudioCommand::AbortCapture { reply }).await
    }

    pub async fn load(&self, data: Arc<[u8]>, format: AudioFormat) -> Result<(), VoiceError> {
        self.send_and_recv(|reply| AudioCommand::Load {
            data,
            format,
            reply,
        })
        .await
    }

    pub async fn play(&self, on_done: PlaybackDoneCallback) -> Result<(), VoiceError> {
        self.send_and_recv(|reply| AudioCommand::Play { on_done, reply }).await
    }

    pub async fn stop_playback(&self) -> Result<(), VoiceError> {
        self.send_and_recv(|reply| AudioCommand::StopPlayback { reply }).await
    }

    pub async fn unload(&self) -> Result<(), VoiceError> {
        self.send_and_recv(|reply| AudioCommand::Unload { reply }).await
    }

    /// Send a command and await its reply. Channel failures map to
    /// [`VoiceError::AudioThreadDied`].
    async fn send_and_recv<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> AudioCommand,
    ) -> Result<T, VoiceError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(build(tx))
            .map_err(|_| VoiceError::AudioThreadDied)?;
        rx.await.map_err(|_| VoiceError::AudioThreadDied)?
    }

    /// Thread body. Owns capture and playback for their entire lifetime.
    fn run(
        gate: SpeakerGate,
        cmd_rx: &mpsc::Receiver<AudioCommand>,
        init_tx: &mpsc::Sender<Result<(), VoiceError>>,
    ) {
        let mut capture = match AudioCapture::new(gate) {
            Ok(c) => c,
            Err(e) => {
                let _ = init_tx.send(Err(e));
                return;
            }
        };

        let mut playback = match AudioPlayback::new() {
            Ok(p) => p,
            Err(e) => {
                let _ = init_tx.send(Err(e));
                return;
            }
        };

        if init_tx.send(Ok(())).is_err() {
            return;
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::RequestPermission { reply } => {
                    let status = match AudioCapture::probe() {
                        Ok(()) => Ok(PermissionStatus::Granted),
                        Err(VoiceError::MicrophonePermissionDenied) => Ok(PermissionStatus::Denied),
                        Err(e) => Err(e),
                    };
                    let _ = reply.send(status);
                }

                AudioCommand::StartCapture { reply } => {
                    let _ = reply.send(capture.start_recording());
                }

                AudioCommand::StopCapture { reply } => {
                    let result = capture.stop_recording().and_then(|samples| {
                        if samples.is_empty() {
                            return Ok(Vec::new());
                        }
                        encode_wav(&samples, RECORDING_SAMPLE_RATE).map_err(VoiceError::from)
                    });
                    let _ = reply.send(result.map(|data| CapturedAudio {
                        data,
                        format: AudioFormat::Wav,
                    }));
                }

                AudioCommand::AbortCapture { reply } => {
                    capture.abort_recording();
                    let _ = reply.send(Ok(()));
                }

                AudioCommand::Load {
                    data,
                    format,
                    reply,
                } => {
                    let _ = reply.send(playback.load(data, format));
                }

                AudioCommand::Play { on_done, reply } => {
                    let _ = reply.send(playback.play(on_done));
                }

                AudioCommand::StopPlayback { reply } => {
                    playback.stop();
                    let _ = reply.send(Ok(()));
                }

                AudioCommand::Unload { reply } => {
                    playback.unload();
                    let _ = reply.send(Ok(()));
                }

                AudioCommand::Shutdown => break,
            }
        }

        // capture and playback are dropped here, on the audio thread
        tracing::debug!("Audio thread shutting down");
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
