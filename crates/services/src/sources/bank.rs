use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{Question, QuestionDraft};
use rand::seq::SliceRandom;

use super::QuestionSource;
use crate::error::QuestionSourceError;

const BUNDLED_QUESTIONS: &str = include_str!("../../data/questions.json");

/// Questions shipped with the application.
#[derive(Debug, Clone)]
pub struct StaticQuestionBank {
    questions: Arc<[Question]>,
    shuffle: bool,
}

impl StaticQuestionBank {
    /// The bank compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` if the bundled JSON is invalid.
    pub fn bundled() -> Result<Self, QuestionSourceError> {
        Self::from_json(BUNDLED_QUESTIONS)
    }

    /// Parse a JSON array of questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` for malformed JSON, an invalid question or
    /// duplicate ids.
    pub fn from_json(raw: &str) -> Result<Self, QuestionSourceError> {
        let drafts: Vec<QuestionDraft> = serde_json::from_str(raw)?;
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate()
                    .map_err(|source| QuestionSourceError::InvalidQuestion { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    /// # Errors
    ///
    /// Returns `QuestionSourceError::DuplicateId` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionSourceError> {
        let mut seen = HashSet::with_capacity(questions.len());
        if let Some(dup) = questions.iter().find(|q| !seen.insert(q.id())) {
            return Err(QuestionSourceError::DuplicateId(dup.id()));
        }
        Ok(Self {
            questions: Arc::from(questions),
            shuffle: true,
        })
    }

    /// Keep bank order instead of picking a random selection.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    fn select(&self, count: u32) -> Vec<Question> {
        let mut picked = self.questions.to_vec();
        if self.shuffle {
            picked.shuffle(&mut rand::rng());
        }
        picked.truncate(usize::try_from(count).unwrap_or(usize::MAX));
        picked
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionBank {
    async fn fetch(&self, count: u32) -> Result<Vec<Question>, QuestionSourceError> {
        Ok(self.select(count))
    }

    fn name(&self) -> &'static str {
        "question bank"
    }
}
