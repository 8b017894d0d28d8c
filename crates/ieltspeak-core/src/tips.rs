//! Practice tips shown before and during a session.

/// General advice shown on the practice menu.
pub const GENERAL_TIPS: &[&str] = &[
    "Speak clearly and confidently",
    "Use a variety of vocabulary and structures",
    "Provide detailed answers with examples",
    "Stay on topic and listen carefully to questions",
    "Practice regularly with a timer",
];

/// Speaking advice shown at the top of a practice session.
pub const SPEAKING_TIPS: &[&str] = &[
    "Speak clearly and at a natural pace",
    "Use a variety of vocabulary and sentence structures",
    "Provide detailed answers with examples",
    "Stay on topic and answer the question directly",
    "Use appropriate linking words to connect your ideas",
    "Practice active listening and ask for clarification if needed",
    "Show confidence through your tone and body language",
    "Don't worry about small mistakes; fluency is key",
];
