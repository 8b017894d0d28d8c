//! Practice question domain types.
//!
//! Questions are fetched once per session and never mutated afterwards. The
//! [`QuestionDeck`] gives the session controller cyclic, cursor-based access.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// IELTS speaking test part a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Part1,
    Part2,
    Part3,
}

impl Category {
    /// All categories in test order.
    pub const ALL: [Self; 3] = [Self::Part1, Self::Part2, Self::Part3];

    /// Value used for the `category` query parameter.
    #[must_use]
    pub const fn as_api_param(&self) -> &'static str {
        match self {
            Self::Part1 => "PART1",
            Self::Part2 => "PART2",
            Self::Part3 => "PART3",
        }
    }

    /// Human-readable label ("Part 1").
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Part1 => "Part 1",
            Self::Part2 => "Part 2",
            Self::Part3 => "Part 3",
        }
    }

    /// What this part of the test consists of, with its typical duration.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Part1 => "Introduction and interview (4-5 minutes)",
            Self::Part2 => "Individual long turn (3-4 minutes)",
            Self::Part3 => "Two-way discussion (4-5 minutes)",
        }
    }

    /// Built-in question used when practising offline.
    #[must_use]
    pub const fn sample_question(&self) -> &'static str {
        match self {
            Self::Part1 => "What do you do in your free time?",
            Self::Part2 => {
                "Describe a place you like to visit. You should say: where it is, how often \
                 you go there, what you do there, and explain why you like visiting this place."
            }
            Self::Part3 => "How do you think leisure activities will change in the future?",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_param())
    }
}

/// Error returned when a category string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown practice category '{0}' (expected PART1, PART2 or PART3)")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    /// Accepts `PART1`, `part1`, `part-1`, `Part 1` and a bare `1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.trim_start_matches("part") {
            "1" => Ok(Self::Part1),
            "2" => Ok(Self::Part2),
            "3" => Ok(Self::Part3),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// What the user chose to practise: a single part, or the full test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PracticeSelection {
    Part(Category),
    FullTest,
}

impl PracticeSelection {
    /// Categories to fetch, in the order they are asked.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        match self {
            Self::Part(category) => vec![*category],
            Self::FullTest => Category::ALL.to_vec(),
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Part(category) => category.label(),
            Self::FullTest => "Full Test",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Part(category) => category.description(),
            Self::FullTest => "Complete IELTS Speaking test simulation (11-14 minutes)",
        }
    }
}

impl From<Category> for PracticeSelection {
    fn from(category: Category) -> Self {
        Self::Part(category)
    }
}

impl fmt::Display for PracticeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Part(category) => category.fmt(f),
            Self::FullTest => f.write_str("FULL"),
        }
    }
}

impl FromStr for PracticeSelection {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "full-test" | "full test" | "fulltest" => Ok(Self::FullTest),
            _ => s.parse().map(Self::Part),
        }
    }
}

/// A single practice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Server-side identifier, when the service provides one.
    pub id: Option<String>,
    pub content: String,
    pub category: Category,
    pub topic: String,
}

impl Question {
    /// Whether there is anything to ask.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// The offline sample question for a category.
    #[must_use]
    pub fn sample(category: Category) -> Self {
        Self {
            id: None,
            content: category.sample_question().to_string(),
            category,
            topic: "General".to_string(),
        }
    }
}

/// The question list holds no questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no questions available")]
pub struct EmptyDeck;

/// Ordered, immutable list of questions with cyclic cursor access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDeck {
    questions: Vec<Question>,
}

impl QuestionDeck {
    #[must_use]
    pub const fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at `cursor mod len`.
    pub fn next(&self, cursor: usize) -> Result<&Question, EmptyDeck> {
        if self.questions.is_empty() {
            return Err(EmptyDeck);
        }
        Ok(&self.questions[cursor % self.questions.len()])
    }

    /// Cursor position after `cursor`, wrapping at the end of the deck.
    #[must_use]
    pub const fn advance(&self, cursor: usize) -> usize {
        if self.questions.is_empty() {
            0
        } else {
            (cursor + 1) % self.questions.len()
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Append another deck, keeping order (used to build a full test).
    pub fn extend(&mut self, other: Self) {
        self.questions.extend(other.questions);
    }
}

impl FromIterator<Question> for QuestionDeck {
    fn from_iter<I: IntoIterator<Item = Question>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(content: &str) -> Question {
        Question {
            id: None,
            content: content.to_string(),
            category: Category::Part1,
            topic: "Hobbies".to_string(),
        }
    }

    #[test]
    fn category_parses_common_spellings() {
        for input in ["PART1", "part1", "part-1", "Part 1", "1", "part_1"] {
            assert_eq!(input.parse::<Category>(), Ok(Category::Part1), "{input}");
        }
        assert_eq!("PART3".parse::<Category>(), Ok(Category::Part3));
        assert!("part4".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_as_api_value() {
        let json = serde_json::to_string(&Category::Part2).unwrap();
        assert_eq!(json, "\"PART2\"");
        let parsed: Category = serde_json::from_str("\"PART3\"").unwrap();
        assert_eq!(parsed, Category::Part3);
    }

    #[test]
    fn selection_parses_full_test() {
        assert_eq!("full".parse::<PracticeSelection>(), Ok(PracticeSelection::FullTest));
        assert_eq!(
            "Full Test".parse::<PracticeSelection>(),
            Ok(PracticeSelection::FullTest)
        );
        assert_eq!(
            "part-2".parse::<PracticeSelection>(),
            Ok(PracticeSelection::Part(Category::Part2))
        );
    }

    #[test]
    fn full_test_asks_parts_in_order() {
        assert_eq!(PracticeSelection::FullTest.categories(), Category::ALL.to_vec());
        assert_eq!(
            PracticeSelection::Part(Category::Part3).categories(),
            vec![Category::Part3]
        );
    }

    #[test]
    fn deck_next_wraps_modulo_length() {
        let deck: QuestionDeck = ["a", "b", "c"].into_iter().map(question).collect();
        assert_eq!(deck.next(0).unwrap().content, "a");
        assert_eq!(deck.next(4).unwrap().content, "b");
        assert_eq!(deck.next(3).unwrap().content, "a");
    }

    #[test]
    fn deck_advance_cycles_back_to_zero() {
        let deck: QuestionDeck = ["a", "b"].into_iter().map(question).collect();
        let mut cursor = 0;
        for _ in 0..deck.len() {
            cursor = deck.advance(cursor);
        }
        assert_eq!(cursor, 0);
    }

    #[test]
    fn empty_deck_reports_empty() {
        let deck = QuestionDeck::default();
        assert_eq!(deck.next(0), Err(EmptyDeck));
        assert_eq!(deck.advance(7), 0);
    }

    #[test]
    fn blank_question_detected() {
        assert!(question("   ").is_blank());
        assert!(!question("Why?").is_blank());
    }

    #[test]
    fn sample_questions_are_not_blank() {
        for category in Category::ALL {
            assert!(!Question::sample(category).is_blank());
        }
    }
}
