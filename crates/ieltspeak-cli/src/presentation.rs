//! Terminal rendering for questions, tips and session events.
//!
//! Everything here returns strings so handlers decide where output goes.

use std::fmt::Write as _;

use ieltspeak_core::tips::{GENERAL_TIPS, SPEAKING_TIPS};
use ieltspeak_core::{Category, PracticeSelection, Question, QuestionDeck, Sender, Turn};
use ieltspeak_voice::{SessionEvent, SessionState};

/// Numbered question list, one question per line.
pub fn format_question_list(deck: &QuestionDeck) -> String {
    if deck.is_empty() {
        return "No questions available for this category.".to_string();
    }
    let mut out = String::new();
    for (index, question) in deck.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. [{}] {}", index + 1, question.topic, question.content);
    }
    out
}

/// A single question with its metadata.
pub fn format_question(question: &Question) -> String {
    let mut out = String::new();
    if let Some(id) = &question.id {
        let _ = writeln!(out, "Id:       {id}");
    }
    let _ = writeln!(out, "Part:     {}", question.category.label());
    let _ = writeln!(out, "Topic:    {}", question.topic);
    let _ = writeln!(out, "Question: {}", question.content);
    out
}

pub fn format_topics(category: Category, topics: &[String]) -> String {
    if topics.is_empty() {
        return format!("No topics available for {}.", category.label());
    }
    let mut out = format!("{} topics:\n", category.label());
    for topic in topics {
        let _ = writeln!(out, "  - {topic}");
    }
    out
}

/// Parts of the test followed by both tip lists.
pub fn format_tips() -> String {
    let mut out = String::from("Parts of the speaking test:\n");
    let selections = Category::ALL
        .into_iter()
        .map(PracticeSelection::Part)
        .chain(std::iter::once(PracticeSelection::FullTest));
    for selection in selections {
        let _ = writeln!(out, "  {:<10} {}", selection.label(), selection.description());
    }

    out.push_str("\nTips:\n");
    for tip in GENERAL_TIPS {
        let _ = writeln!(out, "  - {tip}");
    }
    out.push_str("\nWhile speaking:\n");
    for tip in SPEAKING_TIPS {
        let _ = writeln!(out, "  - {tip}");
    }
    out
}

/// One line for a logged turn.
pub fn format_turn(turn: &Turn) -> String {
    match (turn.sender(), turn.text()) {
        (Sender::Ai, Some(text)) => {
            let audio = if turn.playable().is_some() { "" } else { " (text only)" };
            format!("[{}] Examiner{audio}: {text}", turn.id())
        }
        _ => {
            let size = turn.playable().map_or(0, |clip| clip.len());
            format!("[{}] You: recorded answer ({} KB)", turn.id(), size.div_ceil(1024))
        }
    }
}

/// Line to print for a session event; `None` for events that only matter to
/// the log.
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::TurnAppended(turn) => Some(format_turn(turn)),
        SessionEvent::Notice(notice) => Some(format!("! {}", notice.message)),
        SessionEvent::StateChanged(SessionState::Recording) => {
            Some("* Recording... press Enter to stop".to_string())
        }
        SessionEvent::StateChanged(SessionState::AwaitingAnswer) => {
            Some("Press Enter to answer, `r <turn>` to replay, `q` to quit".to_string())
        }
        SessionEvent::StateChanged(_)
        | SessionEvent::PlaybackStarted { .. }
        | SessionEvent::PlaybackFinished { .. } => None,
    }
}
