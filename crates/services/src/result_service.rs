use std::sync::Arc;

use quiz_core::model::QuizResult;
use storage::repository::{ResultRepository, StorageError};

/// Read access to the quiz history.
#[derive(Clone)]
pub struct ResultService {
    results: Arc<dyn ResultRepository>,
}

impl ResultService {
    #[must_use]
    pub fn new(results: Arc<dyn ResultRepository>) -> Self {
        Self { results }
    }

    /// Most recent results first, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be loaded.
    pub async fn recent(&self, limit: usize) -> Result<Vec<QuizResult>, StorageError> {
        let mut results = self.results.list_results().await?;
        results.reverse();
        results.truncate(limit);
        Ok(results)
    }

    /// Highest score in the history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be loaded.
    pub async fn best_score(&self) -> Result<Option<u32>, StorageError> {
        Ok(self
            .results
            .list_results()
            .await?
            .iter()
            .map(|r| r.score)
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::AnswerRecord;
    use quiz_core::time::fixed_now;
    use storage::Storage;

    fn result(score: u32, minutes: i64) -> QuizResult {
        QuizResult {
            date: fixed_now() + Duration::minutes(minutes),
            score,
            accuracy: 0,
            correct_answers: 0,
            total_questions: 0,
            user_answers: AnswerRecord::new(),
            questions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let storage = Storage::in_memory();
        for (score, minute) in [(10, 0), (40, 1), (20, 2)] {
            storage.results.append_result(&result(score, minute)).await.unwrap();
        }
        let svc = ResultService::new(Arc::clone(&storage.results));

        let recent = svc.recent(2).await.unwrap();
        let scores: Vec<_> = recent.iter().map(|r| r.score).collect();
        assert_eq!(scores, [20, 40]);
        assert_eq!(svc.best_score().await.unwrap(), Some(40));
    }
}
