//! Clip playback via `rodio`.
//!
//! One clip is loaded at a time into a paused sink. `play` resumes it and a
//! watcher thread reports the natural end.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ieltspeak_core::AudioFormat;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::audio_io::PlaybackDoneCallback;
use crate::error::VoiceError;

/// Speaker output. Lives on the audio thread.
pub struct AudioPlayback {
    /// rodio output stream (must be kept alive).
    _stream: OutputStream,

    /// Handle used to create sinks.
    stream_handle: OutputStreamHandle,

    /// Sink holding the loaded clip, paused until `play`.
    sink: Option<Arc<Sink>>,

    /// Set while the loaded clip plays; the watcher swaps it off on natural end.
    is_playing: Arc<AtomicBool>,
}

impl AudioPlayback {
    /// Open the default output device.
    pub fn new() -> Result<Self, VoiceError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| VoiceError::OutputStreamError(e.to_string()))?;

        tracing::info!("Audio playback initialized on default output device");

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
            is_playing: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Decode `data` into a fresh paused sink, replacing any loaded clip.
    pub fn load(&mut self, data: Arc<[u8]>, format: AudioFormat) -> Result<(), VoiceError> {
        self.unload();

        let cursor = Cursor::new(data);
        let decoder = match format {
            AudioFormat::Wav => Decoder::new_wav(cursor),
            AudioFormat::Mpeg => Decoder::new_mp3(cursor),
            AudioFormat::Unknown => Decoder::new(cursor),
        }
        .map_err(|e| VoiceError::Decode(e.to_string()))?;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| VoiceError::OutputStreamError(e.to_string()))?;
        sink.pause();
        sink.append(decoder);

        self.sink = Some(Arc::new(sink));
        tracing::debug!(?format, "Clip loaded");
        Ok(())
    }

    /// Start the loaded clip. `on_done` fires when it drains by itself.
    pub fn play(&mut self, on_done: PlaybackDoneCallback) -> Result<(), VoiceError> {
        let Some(sink) = self.sink.clone() else {
            return Err(VoiceError::OutputStreamError("no clip loaded".to_string()));
        };

        self.is_playing.store(true, Ordering::SeqCst);
        sink.play();

        let is_playing = Arc::clone(&self.is_playing);
        std::thread::Builder::new()
            .name("ieltspeak-playback-watch".into())
            .spawn(move || {
                // Returns early when stop() empties the queue
                sink.sleep_until_end();

                // stop() already cleared the flag; nothing to report
                if !is_playing.swap(false, Ordering::SeqCst) {
                    return;
                }
                tracing::debug!("Playback finished naturally");
                on_done();
            })
            .map_err(|e| VoiceError::OutputStreamError(format!("failed to spawn watcher: {e}")))?;

        Ok(())
    }

    /// Stop the loaded clip without reporting completion.
    pub fn stop(&mut self) {
        self.is_playing.store(false, Ordering::SeqCst);
        if let Some(sink) = &self.sink {
            sink.stop();
        }
    }

    /// Drop the loaded clip.
    pub fn unload(&mut self) {
        self.stop();
        if self.sink.take().is_some() {
            tracing::debug!("Clip unloaded");
        }
    }
}
