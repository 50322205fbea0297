//! Where quiz questions come from.

use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use quiz_core::model::Question;
use rand::seq::SliceRandom;

use crate::error::QuestionSourceError;

mod bank;
mod trivia;

pub use bank::StaticQuestionBank;
pub use trivia::{DEFAULT_TRIVIA_URL, TriviaApiSource};

/// Produces the ordered question list for one quiz.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch up to `count` questions. Ids are unique within the returned list.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` if the questions cannot be produced.
    async fn fetch(&self, count: u32) -> Result<Vec<Question>, QuestionSourceError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Tries `primary` and falls back to `secondary` on any error.
#[derive(Clone)]
pub struct FallbackSource {
    primary: Arc<dyn QuestionSource>,
    secondary: Arc<dyn QuestionSource>,
}

impl FallbackSource {
    #[must_use]
    pub fn new(primary: Arc<dyn QuestionSource>, secondary: Arc<dyn QuestionSource>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl QuestionSource for FallbackSource {
    async fn fetch(&self, count: u32) -> Result<Vec<Question>, QuestionSourceError> {
        match self.primary.fetch(count).await {
            Ok(questions) => Ok(questions),
            Err(err) => {
                warn!(
                    "{} failed ({err}), using {}",
                    self.primary.name(),
                    self.secondary.name()
                );
                self.secondary.fetch(count).await
            }
        }
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

/// Answer choices in random order for display.
#[must_use]
pub fn shuffled_choices(question: &Question) -> Vec<String> {
    let mut choices: Vec<String> = question.choices().into_iter().map(str::to_owned).collect();
    choices.shuffle(&mut rand::rng());
    choices
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionDraft, QuestionId};

    struct Failing;

    #[async_trait]
    impl QuestionSource for Failing {
        async fn fetch(&self, _count: u32) -> Result<Vec<Question>, QuestionSourceError> {
            Err(QuestionSourceError::Empty)
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn question(id: u64) -> Question {
        QuestionDraft {
            id: QuestionId::new(id),
            category: String::new(),
            difficulty: Default::default(),
            prompt: "Pick one".into(),
            correct_answer: "a".into(),
            incorrect_answers: vec!["b".into(), "c".into()],
            points: 10,
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn falls_back_when_primary_fails() {
        let bank = StaticQuestionBank::new(vec![question(1), question(2)]).unwrap();
        let source = FallbackSource::new(Arc::new(Failing), Arc::new(bank));
        let questions = source.fetch(5).await.unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[tokio::test]
    async fn secondary_errors_are_returned() {
        let source = FallbackSource::new(Arc::new(Failing), Arc::new(Failing));
        assert!(matches!(
            source.fetch(5).await,
            Err(QuestionSourceError::Empty)
        ));
    }

    #[test]
    fn shuffled_choices_keep_every_answer() {
        let mut choices = shuffled_choices(&question(1));
        choices.sort();
        assert_eq!(choices, ["a", "b", "c"]);
    }
}
