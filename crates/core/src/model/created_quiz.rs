use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};
use crate::model::question::{
    DEFAULT_QUESTION_POINTS, Difficulty, Question, QuestionDraft, QuestionError,
};

/// A created quiz never plays more than this many questions.
pub const MAX_CREATED_QUIZ_QUESTIONS: usize = 10;

pub const CUSTOM_CATEGORY: &str = "Custom";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CreatedQuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("a quiz needs at least one question")]
    NoQuestions,

    #[error("question {index}: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// One question as typed into the quiz editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedQuestionInput {
    pub question: String,
    pub correct_answer: String,
    /// Comma separated list, e.g. `"Paris, Rome, Berlin"`.
    pub incorrect_answers: String,
}

impl CreatedQuestionInput {
    #[must_use]
    pub fn new(
        question: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            correct_answer: correct_answer.into(),
            incorrect_answers: incorrect_answers.into(),
        }
    }

    fn into_question(self, id: QuestionId) -> Result<Question, QuestionError> {
        let incorrect_answers = self
            .incorrect_answers
            .split(',')
            .map(str::trim)
            .filter(|answer| !answer.is_empty())
            .map(str::to_owned)
            .collect();

        QuestionDraft {
            id,
            category: CUSTOM_CATEGORY.to_owned(),
            difficulty: Difficulty::Medium,
            prompt: self.question,
            correct_answer: self.correct_answer,
            incorrect_answers,
            points: DEFAULT_QUESTION_POINTS,
        }
        .validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedQuizDraft {
    pub title: String,
    pub questions: Vec<CreatedQuestionInput>,
    pub schedule_at: Option<DateTime<Utc>>,
}

impl CreatedQuizDraft {
    /// Validate the editor input into a stored quiz.
    ///
    /// Questions are numbered from 1 in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `CreatedQuizError` for an empty title, no questions, or the
    /// first invalid question.
    pub fn validate(self, id: QuizId, now: DateTime<Utc>) -> Result<CreatedQuiz, CreatedQuizError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(CreatedQuizError::EmptyTitle);
        }
        if self.questions.is_empty() {
            return Err(CreatedQuizError::NoQuestions);
        }

        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                input
                    .into_question(QuestionId::new(index as u64 + 1))
                    .map_err(|source| CreatedQuizError::InvalidQuestion { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CreatedQuiz {
            id,
            title,
            questions,
            schedule_at: self.schedule_at,
            created_at: now,
        })
    }
}

//
// ─── CREATED QUIZ ──────────────────────────────────────────────────────────────
//

/// A user-authored quiz, optionally scheduled for a start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedQuiz {
    pub id: QuizId,
    pub title: String,
    pub questions: Vec<Question>,
    pub schedule_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CreatedQuiz {
    /// Questions to play, capped at [`MAX_CREATED_QUIZ_QUESTIONS`].
    #[must_use]
    pub fn playable_questions(&self) -> Vec<Question> {
        self.questions
            .iter()
            .take(MAX_CREATED_QUIZ_QUESTIONS)
            .cloned()
            .collect()
    }

    /// Scheduled to start after `now` but no later than `now + window`.
    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.schedule_at
            .is_some_and(|at| at > now && at - now <= window)
    }
}
