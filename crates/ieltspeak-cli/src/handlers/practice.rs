//! `ieltspeak practice`: run a spoken practice session in the terminal.
//!
//! The session controller does the work; this handler wires it to stdin and
//! stdout. Events are printed by a separate task so notices show up while
//! the input loop waits for the next line.

use std::sync::Arc;

use anyhow::Result;
use ieltspeak_core::{
    NoopSynthesizer, QuestionSource, Settings, SpeechSynthesizer, StaticQuestionSource, TurnId,
    validate_settings,
};
use ieltspeak_voice::{
    AudioDevice, ReplayOutcome, SessionConfig, SessionController, SessionError, SessionEvent,
    SessionHandle, SessionState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::bootstrap::CliContext;
use crate::commands::PracticeArgs;
use crate::error::CliError;
use crate::presentation::{format_tips, render_event};

/// A line typed during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeInput {
    /// Empty line: start or stop recording.
    Toggle,
    Replay(TurnId),
    Refetch,
    Help,
    Quit,
    Unknown(String),
}

impl PracticeInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => return Self::Toggle,
            "q" | "quit" | "exit" => return Self::Quit,
            "f" | "refetch" => return Self::Refetch,
            "h" | "help" | "?" => return Self::Help,
            _ => {}
        }

        let replay_arg = line
            .strip_prefix("replay")
            .or_else(|| line.strip_prefix('r'))
            .map(str::trim);
        match replay_arg.map(str::parse::<u64>) {
            Some(Ok(id)) => Self::Replay(TurnId(id)),
            _ => Self::Unknown(line.to_string()),
        }
    }
}

const HELP: &str = "Enter: start/stop recording | r <turn>: replay a turn | f: fetch questions again | q: quit";

pub async fn execute(ctx: &CliContext, args: PracticeArgs) -> Result<()> {
    let settings = session_settings(&ctx.settings, &args)?;
    let duplex = args.duplex || settings.effective_duplex_audio();
    let device = open_device(duplex)?;

    let source: Arc<dyn QuestionSource>;
    let synthesizer: Arc<dyn SpeechSynthesizer>;
    if args.offline {
        source = Arc::new(StaticQuestionSource::samples());
        synthesizer = Arc::new(NoopSynthesizer);
    } else {
        source = ctx.client().clone();
        synthesizer = ctx.client().clone();
    }

    let config = SessionConfig::from_settings(args.category, &settings);
    println!(
        "{}: {}",
        config.selection.label(),
        config.selection.description()
    );
    print!("{}", format_tips());
    println!("\n{HELP}\n");

    tracing::info!(
        selection = %config.selection,
        offline = args.offline,
        duplex,
        "Starting practice session"
    );
    let (session, events) = SessionController::spawn(config, source, synthesizer, device);
    let printer = tokio::spawn(print_events(events));

    if let Err(e) = session.begin().await {
        tracing::debug!(error = %e, "Session did not start");
    }

    let outcome = input_loop(&session).await;

    session.teardown().await.map_err(CliError::from)?;
    // Closing the handle ends the event stream and the printer
    drop(session);
    let _ = printer.await;
    outcome
}

/// Settings with the practice flags applied on top.
fn session_settings(settings: &Settings, args: &PracticeArgs) -> Result<Settings, CliError> {
    let mut settings = settings.clone();
    if let Some(ms) = args.advance_delay_ms {
        settings.advance_delay_ms = Some(ms);
    }
    validate_settings(&settings)?;
    Ok(settings)
}

#[cfg(feature = "local-audio")]
fn open_device(duplex: bool) -> Result<AudioDevice, CliError> {
    use ieltspeak_voice::{AudioDeviceConfig, LocalAudioBackend, SpeakerGate};

    let gate = SpeakerGate::new();
    let backend = LocalAudioBackend::open(gate.clone())?;
    Ok(AudioDevice::new(
        Arc::new(backend),
        AudioDeviceConfig { duplex },
        gate,
    ))
}

#[cfg(not(feature = "local-audio"))]
fn open_device(_duplex: bool) -> Result<AudioDevice, CliError> {
    Err(CliError::AudioUnavailable)
}

async fn input_loop(session: &SessionHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.map_err(CliError::from)?,
            _ = tokio::signal::ctrl_c() => None,
        };
        // EOF or Ctrl-C
        let Some(line) = line else {
            return Ok(());
        };

        let result = match PracticeInput::parse(&line) {
            PracticeInput::Toggle => toggle_recording(session).await,
            PracticeInput::Replay(turn) => session.replay(turn).await.map(|outcome| {
                if outcome == ReplayOutcome::Stopped {
                    println!("Playback stopped");
                }
            }),
            PracticeInput::Refetch => session.refetch().await,
            PracticeInput::Help => {
                println!("{HELP}");
                Ok(())
            }
            PracticeInput::Quit => return Ok(()),
            PracticeInput::Unknown(input) => {
                println!("Unknown input '{input}'. {HELP}");
                Ok(())
            }
        };

        match result {
            Err(SessionError::Closed) => return Ok(()),
            // Everything else was already printed as a notice
            Err(e) => tracing::debug!(error = %e, "Session action failed"),
            Ok(()) => {}
        }
    }
}

async fn toggle_recording(session: &SessionHandle) -> Result<(), SessionError> {
    if session.state() == SessionState::Recording {
        session.stop_answering().await.map(|_| ())
    } else {
        session.start_answering().await
    }
}

async fn print_events(mut events: UnboundedReceiver<SessionEvent>) {
    while let Some(event) = events.recv().await {
        if let Some(line) = render_event(&event) {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use ieltspeak_core::{Category, PracticeSelection};

    fn args() -> PracticeArgs {
        PracticeArgs {
            category: PracticeSelection::Part(Category::Part1),
            offline: true,
            advance_delay_ms: None,
            duplex: false,
        }
    }

    #[test]
    fn empty_line_toggles_recording() {
        assert_eq!(PracticeInput::parse(""), PracticeInput::Toggle);
        assert_eq!(PracticeInput::parse("   "), PracticeInput::Toggle);
    }

    #[test]
    fn replay_takes_a_turn_number() {
        assert_eq!(PracticeInput::parse("r 3"), PracticeInput::Replay(TurnId(3)));
        assert_eq!(PracticeInput::parse("r3"), PracticeInput::Replay(TurnId(3)));
        assert_eq!(
            PracticeInput::parse("replay 12"),
            PracticeInput::Replay(TurnId(12))
        );
        assert_eq!(
            PracticeInput::parse("r x"),
            PracticeInput::Unknown("r x".to_string())
        );
    }

    #[test]
    fn quit_and_refetch_words() {
        assert_eq!(PracticeInput::parse("q"), PracticeInput::Quit);
        assert_eq!(PracticeInput::parse("exit"), PracticeInput::Quit);
        assert_eq!(PracticeInput::parse("f"), PracticeInput::Refetch);
        assert_eq!(PracticeInput::parse("?"), PracticeInput::Help);
    }

    #[test]
    fn advance_delay_flag_overrides_settings() {
        let mut practice = args();
        practice.advance_delay_ms = Some(250);
        let settings = session_settings(&Settings::with_defaults(), &practice).unwrap();
        assert_eq!(settings.effective_advance_delay(), Duration::from_millis(250));
    }

    #[test]
    fn advance_delay_flag_is_validated() {
        let mut practice = args();
        practice.advance_delay_ms = Some(120_000);
        let err = session_settings(&Settings::default(), &practice).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[cfg(not(feature = "local-audio"))]
    #[test]
    fn practice_reports_missing_audio_support() {
        assert!(matches!(
            open_device(false),
            Err(CliError::AudioUnavailable)
        ));
    }
}
