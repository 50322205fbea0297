use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use quiz_core::model::{CreatedQuiz, Leaderboard, QuizId, QuizResult, UserStats};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::{
    AccountRepository, CreatedQuizRepository, KeyValueStore, LeaderboardRepository,
    ResultRepository, StatsRepository, StorageError, StorageKey,
};

/// Typed repositories over a [`KeyValueStore`], one JSON document per key.
///
/// Missing documents read as defaults. Unreadable documents are logged and
/// also read as defaults when loaded, so one corrupt value never locks the
/// player out. Updates that extend a stored document refuse to overwrite an
/// unreadable one.
#[derive(Clone)]
pub struct JsonRepository {
    store: Arc<dyn KeyValueStore>,
}

impl JsonRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read<T>(&self, key: StorageKey) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("ignoring unreadable value under {key}: {err}");
                Ok(T::default())
            }
        }
    }

    /// Like `read`, but an unreadable document is an error. Used before
    /// writing a document back so its old entries are never replaced.
    async fn read_for_update<T>(&self, key: StorageKey) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(T::default());
        };
        serde_json::from_str(&raw).map_err(|err| {
            warn!("refusing to overwrite unreadable value under {key}: {err}");
            StorageError::Serialization(format!("{key}: {err}"))
        })
    }

    async fn write<T>(&self, key: StorageKey, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + Sync,
    {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        debug!("writing {key} ({} bytes)", raw.len());
        self.store.set(key, &raw).await
    }
}

#[async_trait]
impl AccountRepository for JsonRepository {
    async fn current_user(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .store
            .get(StorageKey::CurrentUser)
            .await?
            .filter(|name| !name.trim().is_empty()))
    }

    async fn set_current_user(&self, name: &str) -> Result<(), StorageError> {
        self.store.set(StorageKey::CurrentUser, name).await
    }

    async fn clear_current_user(&self) -> Result<(), StorageError> {
        self.store.remove(StorageKey::CurrentUser).await
    }
}

#[async_trait]
impl StatsRepository for JsonRepository {
    async fn load_stats(&self) -> Result<UserStats, StorageError> {
        self.read(StorageKey::UserStats).await
    }

    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        self.write(StorageKey::UserStats, stats).await
    }
}

#[async_trait]
impl ResultRepository for JsonRepository {
    async fn list_results(&self) -> Result<Vec<QuizResult>, StorageError> {
        self.read(StorageKey::Results).await
    }

    async fn append_result(&self, result: &QuizResult) -> Result<(), StorageError> {
        let mut results: Vec<QuizResult> = self.read_for_update(StorageKey::Results).await?;
        results.push(result.clone());
        self.write(StorageKey::Results, &results).await
    }
}

#[async_trait]
impl LeaderboardRepository for JsonRepository {
    async fn load_leaderboard(&self) -> Result<Leaderboard, StorageError> {
        self.read(StorageKey::Leaderboard).await
    }

    async fn save_leaderboard(&self, board: &Leaderboard) -> Result<(), StorageError> {
        self.read_for_update::<Leaderboard>(StorageKey::Leaderboard).await?;
        self.write(StorageKey::Leaderboard, board).await
    }
}

#[async_trait]
impl CreatedQuizRepository for JsonRepository {
    async fn list_created(&self) -> Result<Vec<CreatedQuiz>, StorageError> {
        self.read(StorageKey::CreatedQuizzes).await
    }

    async fn save_created(&self, quiz: &CreatedQuiz) -> Result<(), StorageError> {
        let mut quizzes: Vec<CreatedQuiz> =
            self.read_for_update(StorageKey::CreatedQuizzes).await?;
        match quizzes.iter_mut().find(|q| q.id == quiz.id) {
            Some(existing) => *existing = quiz.clone(),
            None => quizzes.push(quiz.clone()),
        }
        self.write(StorageKey::CreatedQuizzes, &quizzes).await
    }

    async fn get_created(&self, id: QuizId) -> Result<CreatedQuiz, StorageError> {
        let quizzes: Vec<CreatedQuiz> = self.read(StorageKey::CreatedQuizzes).await?;
        quizzes
            .into_iter()
            .find(|q| q.id == id)
            .ok_or(StorageError::NotFound)
    }

    async fn completed_ids(&self) -> Result<Vec<QuizId>, StorageError> {
        self.read(StorageKey::CompletedQuizIds).await
    }

    async fn mark_completed(&self, id: QuizId) -> Result<(), StorageError> {
        let mut ids: Vec<QuizId> = self.read_for_update(StorageKey::CompletedQuizIds).await?;
        if ids.contains(&id) {
            return Ok(());
        }
        ids.push(id);
        self.write(StorageKey::CompletedQuizIds, &ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use quiz_core::model::{CreatedQuestionInput, CreatedQuizDraft};
    use quiz_core::time::fixed_now;

    fn repo() -> (Arc<InMemoryStore>, JsonRepository) {
        let store = Arc::new(InMemoryStore::new());
        let repo = JsonRepository::new(store.clone());
        (store, repo)
    }

    fn created(title: &str) -> CreatedQuiz {
        CreatedQuizDraft {
            title: title.into(),
            questions: vec![CreatedQuestionInput::new("2 + 2?", "4", "3, 5")],
            schedule_at: None,
        }
        .validate(QuizId::generate(), fixed_now())
        .unwrap()
    }

    #[tokio::test]
    async fn missing_documents_read_as_defaults() {
        let (_, repo) = repo();
        assert_eq!(repo.load_stats().await.unwrap(), UserStats::default());
        assert!(repo.list_results().await.unwrap().is_empty());
        assert!(repo.load_leaderboard().await.unwrap().is_empty());
        assert!(repo.completed_ids().await.unwrap().is_empty());
        assert_eq!(repo.current_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_document_reads_as_default() {
        let (store, repo) = repo();
        store.set(StorageKey::UserStats, "{not json").await.unwrap();
        assert_eq!(repo.load_stats().await.unwrap(), UserStats::default());
    }

    #[tokio::test]
    async fn stats_round_trip_with_camel_case_keys() {
        let (store, repo) = repo();
        let stats = UserStats {
            total_quizzes: 3,
            xp: 120,
            ..UserStats::default()
        };
        repo.save_stats(&stats).await.unwrap();

        let raw = store.get(StorageKey::UserStats).await.unwrap().unwrap();
        assert!(raw.contains("\"totalQuizzes\":3"));
        assert_eq!(repo.load_stats().await.unwrap(), stats);
    }

    #[tokio::test]
    async fn current_user_is_plain_text() {
        let (store, repo) = repo();
        repo.set_current_user("ada").await.unwrap();
        assert_eq!(
            store.get(StorageKey::CurrentUser).await.unwrap().as_deref(),
            Some("ada")
        );
        repo.clear_current_user().await.unwrap();
        assert_eq!(repo.current_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn created_quizzes_upsert_by_id() {
        let (_, repo) = repo();
        let mut quiz = created("Maths");
        repo.save_created(&quiz).await.unwrap();
        repo.save_created(&created("Other")).await.unwrap();

        quiz.title = "Arithmetic".into();
        repo.save_created(&quiz).await.unwrap();

        let all = repo.list_created().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(repo.get_created(quiz.id).await.unwrap().title, "Arithmetic");
        assert!(matches!(
            repo.get_created(QuizId::generate()).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn mark_completed_is_idempotent() {
        let (_, repo) = repo();
        let id = QuizId::generate();
        repo.mark_completed(id).await.unwrap();
        repo.mark_completed(id).await.unwrap();
        assert_eq!(repo.completed_ids().await.unwrap(), [id]);
    }

    #[tokio::test]
    async fn unreadable_history_is_kept_on_append() {
        let (store, repo) = repo();
        let result = |score| QuizResult {
            date: fixed_now(),
            score,
            accuracy: 0,
            correct_answers: 0,
            total_questions: 0,
            user_answers: Default::default(),
            questions: Vec::new(),
        };
        repo.append_result(&result(10)).await.unwrap();
        repo.append_result(&result(20)).await.unwrap();

        let raw = store.get(StorageKey::Results).await.unwrap().unwrap();
        let tampered = raw.replacen("\"score\":10", "\"score\":-1", 1);
        assert_ne!(raw, tampered);
        store.set(StorageKey::Results, &tampered).await.unwrap();

        let err = repo.append_result(&result(30)).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
        assert_eq!(
            store.get(StorageKey::Results).await.unwrap().as_deref(),
            Some(tampered.as_str())
        );
        // plain loads still fall back
        assert!(repo.list_results().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_lists_are_not_overwritten() {
        let (store, repo) = repo();
        store.set(StorageKey::CreatedQuizzes, "[{").await.unwrap();
        store.set(StorageKey::CompletedQuizIds, "nope").await.unwrap();
        store.set(StorageKey::Leaderboard, "{}").await.unwrap();

        assert!(repo.save_created(&created("Maths")).await.is_err());
        assert!(repo.mark_completed(QuizId::generate()).await.is_err());
        assert!(repo.save_leaderboard(&Leaderboard::new()).await.is_err());
        assert_eq!(
            store.get(StorageKey::CreatedQuizzes).await.unwrap().as_deref(),
            Some("[{")
        );
    }
}
