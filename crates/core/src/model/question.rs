use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Points awarded for a question when the source does not say otherwise.
pub const DEFAULT_QUESTION_POINTS: u32 = 10;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyPrompt,

    #[error("correct answer cannot be empty")]
    EmptyCorrectAnswer,

    #[error("at least one incorrect answer is required")]
    NoIncorrectAnswers,

    #[error("answer choices must be distinct, found duplicate {0:?}")]
    DuplicateAnswer(String),

    #[error("points must be > 0")]
    ZeroPoints,

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(QuestionError::UnknownDifficulty(other.to_owned())),
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

fn default_points() -> u32 {
    DEFAULT_QUESTION_POINTS
}

/// Unvalidated question shape as it arrives from a question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: QuestionId,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(rename = "question")]
    pub prompt: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    #[serde(default = "default_points")]
    pub points: u32,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// Text fields are trimmed; incorrect answers keep their order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when text is empty, there are no incorrect answers,
    /// any two choices collide, or `points` is zero.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let correct_answer = self.correct_answer.trim().to_owned();
        if correct_answer.is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }
        if self.points == 0 {
            return Err(QuestionError::ZeroPoints);
        }

        let incorrect_answers: Vec<String> = self
            .incorrect_answers
            .into_iter()
            .map(|answer| answer.trim().to_owned())
            .filter(|answer| !answer.is_empty())
            .collect();
        if incorrect_answers.is_empty() {
            return Err(QuestionError::NoIncorrectAnswers);
        }

        let mut seen = HashSet::with_capacity(incorrect_answers.len() + 1);
        seen.insert(correct_answer.as_str());
        for answer in &incorrect_answers {
            if !seen.insert(answer.as_str()) {
                return Err(QuestionError::DuplicateAnswer(answer.clone()));
            }
        }

        Ok(Question {
            id: self.id,
            category: self.category.trim().to_owned(),
            difficulty: self.difficulty,
            prompt,
            correct_answer,
            incorrect_answers,
            points: self.points,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question.
///
/// Construct through [`QuestionDraft::validate`]; deserialization goes through the
/// same validation, so a `Question` always has a non-empty prompt, a correct answer
/// distinct from every incorrect one, and positive points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDraft", into = "QuestionDraft")]
pub struct Question {
    id: QuestionId,
    category: String,
    difficulty: Difficulty,
    prompt: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    points: u32,
}

impl TryFrom<QuestionDraft> for Question {
    type Error = QuestionError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<Question> for QuestionDraft {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            category: q.category,
            difficulty: q.difficulty,
            prompt: q.prompt,
            correct_answer: q.correct_answer,
            incorrect_answers: q.incorrect_answers,
            points: q.points,
        }
    }
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Exact comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    /// All choices: incorrect answers in order, then the correct one.
    ///
    /// Callers that present choices are expected to shuffle them.
    #[must_use]
    pub fn choices(&self) -> Vec<&str> {
        self.incorrect_answers
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.correct_answer.as_str()))
            .collect()
    }

    /// Same question under a different id, used when renumbering a question list.
    #[must_use]
    pub fn with_id(mut self, id: QuestionId) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new(1),
            category: "Science".into(),
            difficulty: Difficulty::Easy,
            prompt: "  What is H2O? ".into(),
            correct_answer: "Water".into(),
            incorrect_answers: vec!["Salt".into(), " Air ".into()],
            points: 10,
        }
    }

    #[test]
    fn validate_trims_and_keeps_order() {
        let q = draft().validate().unwrap();
        assert_eq!(q.prompt(), "What is H2O?");
        assert_eq!(q.incorrect_answers(), ["Salt", "Air"]);
        assert_eq!(q.choices(), vec!["Salt", "Air", "Water"]);
    }

    #[test]
    fn duplicate_of_correct_answer_is_rejected() {
        let mut d = draft();
        d.incorrect_answers.push("Water".into());
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::DuplicateAnswer("Water".into())
        );
    }

    #[test]
    fn blank_incorrect_answers_do_not_count() {
        let mut d = draft();
        d.incorrect_answers = vec!["  ".into()];
        assert_eq!(d.validate().unwrap_err(), QuestionError::NoIncorrectAnswers);
    }

    #[test]
    fn zero_points_rejected() {
        let mut d = draft();
        d.points = 0;
        assert_eq!(d.validate().unwrap_err(), QuestionError::ZeroPoints);
    }

    #[test]
    fn is_correct_is_exact() {
        let q = draft().validate().unwrap();
        assert!(q.is_correct("Water"));
        assert!(!q.is_correct("water"));
    }

    #[test]
    fn deserialize_applies_defaults_and_validation() {
        let json = r#"{"id":3,"question":"2+2?","correct_answer":"4","incorrect_answers":["3","5"]}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.points(), DEFAULT_QUESTION_POINTS);
        assert_eq!(q.difficulty(), Difficulty::Medium);

        let bad = r#"{"id":3,"question":"2+2?","correct_answer":"4","incorrect_answers":["4"]}"#;
        assert!(serde_json::from_str::<Question>(bad).is_err());
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
    }
}
