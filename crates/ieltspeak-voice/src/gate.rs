//! Speaker gate: keeps playback from bleeding into a recording.
//!
//! While a clip plays through the speaker, a recording opened in duplex mode
//! would pick the question audio back up. The device raises this flag for the
//! duration of playback and the capture path drops samples while it is up.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag coordinating audio capture and playback.
#[derive(Debug, Clone, Default)]
pub struct SpeakerGate {
    speaker_active: Arc<AtomicBool>,
}

impl SpeakerGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the speaker as playing; capture discards samples.
    pub fn raise(&self) {
        if !self.speaker_active.swap(true, Ordering::SeqCst) {
            tracing::debug!("Speaker gate raised, mic samples dropped");
        }
    }

    /// Mark the speaker as silent; capture resumes.
    pub fn lower(&self) {
        if self.speaker_active.swap(false, Ordering::SeqCst) {
            tracing::debug!("Speaker gate lowered, mic open");
        }
    }

    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.speaker_active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_starts_lowered() {
        assert!(!SpeakerGate::new().is_raised());
    }

    #[test]
    fn gate_raise_lower() {
        let gate = SpeakerGate::new();
        gate.raise();
        assert!(gate.is_raised());
        gate.raise();
        assert!(gate.is_raised());
        gate.lower();
        assert!(!gate.is_raised());
    }

    #[test]
    fn clones_share_state() {
        let gate = SpeakerGate::new();
        let other = gate.clone();
        gate.raise();
        assert!(other.is_raised());
        other.lower();
        assert!(!gate.is_raised());
    }
}
