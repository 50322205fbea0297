use std::sync::Arc;

use chrono::Duration;
use log::debug;
use quiz_core::Clock;
use quiz_core::model::{CreatedQuiz, CreatedQuizDraft, Question, QuizId};
use storage::repository::{CreatedQuizRepository, StorageError};

use crate::error::CreatedQuizServiceError;

/// A scheduled quiz counts as upcoming this long before its start.
pub const DEFAULT_UPCOMING_WINDOW_SECS: i64 = 60;

/// Authoring, listing and scheduling of user-created quizzes.
#[derive(Clone)]
pub struct CreatedQuizService {
    clock: Clock,
    quizzes: Arc<dyn CreatedQuizRepository>,
}

impl CreatedQuizService {
    #[must_use]
    pub fn new(clock: Clock, quizzes: Arc<dyn CreatedQuizRepository>) -> Self {
        Self { clock, quizzes }
    }

    /// Validate and store a new quiz.
    ///
    /// # Errors
    ///
    /// Returns `CreatedQuizServiceError` for invalid drafts or storage failures.
    pub async fn create(
        &self,
        draft: CreatedQuizDraft,
    ) -> Result<CreatedQuiz, CreatedQuizServiceError> {
        let quiz = draft.validate(QuizId::generate(), self.clock.now())?;
        self.quizzes.save_created(&quiz).await?;
        debug!("created quiz {} ({} questions)", quiz.id, quiz.questions.len());
        Ok(quiz)
    }

    /// Quizzes that have not been played yet, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lists cannot be loaded.
    pub async fn visible(&self) -> Result<Vec<CreatedQuiz>, StorageError> {
        let completed = self.quizzes.completed_ids().await?;
        let mut quizzes = self.quizzes.list_created().await?;
        quizzes.retain(|q| !completed.contains(&q.id));
        Ok(quizzes)
    }

    /// Visible quizzes scheduled to start within `window`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lists cannot be loaded.
    pub async fn upcoming(&self, window: Duration) -> Result<Vec<CreatedQuiz>, StorageError> {
        let now = self.clock.now();
        let mut quizzes = self.visible().await?;
        quizzes.retain(|q| q.is_upcoming(now, window));
        Ok(quizzes)
    }

    /// Questions to play for a created quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown id.
    pub async fn questions_for(&self, id: QuizId) -> Result<Vec<Question>, StorageError> {
        Ok(self.quizzes.get_created(id).await?.playable_questions())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the id cannot be stored.
    pub async fn mark_completed(&self, id: QuizId) -> Result<(), StorageError> {
        self.quizzes.mark_completed(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{CreatedQuestionInput, CreatedQuizError};
    use quiz_core::time::fixed_now;
    use storage::Storage;

    fn draft(title: &str, schedule_in: Option<i64>) -> CreatedQuizDraft {
        CreatedQuizDraft {
            title: title.into(),
            questions: vec![CreatedQuestionInput::new("Largest planet?", "Jupiter", "Mars, Venus")],
            schedule_at: schedule_in.map(|secs| fixed_now() + Duration::seconds(secs)),
        }
    }

    fn service() -> CreatedQuizService {
        let storage = Storage::in_memory();
        CreatedQuizService::new(Clock::fixed(fixed_now()), Arc::clone(&storage.created_quizzes))
    }

    #[tokio::test]
    async fn completed_quizzes_are_hidden() {
        let svc = service();
        let first = svc.create(draft("Planets", None)).await.unwrap();
        svc.create(draft("More planets", None)).await.unwrap();

        svc.mark_completed(first.id).await.unwrap();
        let visible = svc.visible().await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "More planets");
    }

    #[tokio::test]
    async fn upcoming_uses_window() {
        let svc = service();
        svc.create(draft("Soon", Some(30))).await.unwrap();
        svc.create(draft("Later", Some(600))).await.unwrap();
        svc.create(draft("Unscheduled", None)).await.unwrap();

        let window = Duration::seconds(DEFAULT_UPCOMING_WINDOW_SECS);
        let upcoming = svc.upcoming(window).await.unwrap();
        let titles: Vec<_> = upcoming.iter().map(|q| q.title.as_str()).collect();
        assert_eq!(titles, ["Soon"]);
    }

    #[tokio::test]
    async fn invalid_drafts_are_not_stored() {
        let svc = service();
        let err = svc.create(draft(" ", None)).await.unwrap_err();
        assert!(matches!(
            err,
            CreatedQuizServiceError::CreatedQuiz(CreatedQuizError::EmptyTitle)
        ));
        assert!(svc.visible().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn questions_for_unknown_quiz_fails() {
        let svc = service();
        assert!(matches!(
            svc.questions_for(QuizId::generate()).await,
            Err(StorageError::NotFound)
        ));
    }
}
