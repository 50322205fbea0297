use async_trait::async_trait;
use quiz_core::model::{CreatedQuiz, Leaderboard, QuizId, QuizResult, UserStats};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::json::JsonRepository;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── KEYS ──────────────────────────────────────────────────────────────────────
//

/// The fixed set of documents the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Name of the logged-in player, stored as plain text.
    CurrentUser,
    UserStats,
    Results,
    Leaderboard,
    CreatedQuizzes,
    CompletedQuizIds,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::CurrentUser,
        StorageKey::UserStats,
        StorageKey::Results,
        StorageKey::Leaderboard,
        StorageKey::CreatedQuizzes,
        StorageKey::CompletedQuizIds,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::CurrentUser => "quizUser",
            StorageKey::UserStats => "quizUserStats",
            StorageKey::Results => "quizResults",
            StorageKey::Leaderboard => "leaderboard",
            StorageKey::CreatedQuizzes => "createdQuizzes",
            StorageKey::CompletedQuizIds => "completedQuizIds",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── PORTS ─────────────────────────────────────────────────────────────────────
//

/// Raw string values under fixed keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Name of the logged-in player, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn current_user(&self) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the name cannot be stored.
    async fn set_current_user(&self, name: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn clear_current_user(&self) -> Result<(), StorageError>;
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Stored stats, or defaults when nothing readable is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn load_stats(&self) -> Result<UserStats, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the stats cannot be stored.
    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// All finished quizzes, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn list_results(&self) -> Result<Vec<QuizResult>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be stored.
    async fn append_result(&self, result: &QuizResult) -> Result<(), StorageError>;
}

#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn load_leaderboard(&self) -> Result<Leaderboard, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the leaderboard cannot be stored.
    async fn save_leaderboard(&self, board: &Leaderboard) -> Result<(), StorageError>;
}

#[async_trait]
pub trait CreatedQuizRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn list_created(&self) -> Result<Vec<CreatedQuiz>, StorageError>;

    /// Insert or replace a created quiz by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz list cannot be stored.
    async fn save_created(&self, quiz: &CreatedQuiz) -> Result<(), StorageError>;

    /// Fetch one created quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no quiz has this id.
    async fn get_created(&self, id: QuizId) -> Result<CreatedQuiz, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn completed_ids(&self) -> Result<Vec<QuizId>, StorageError>;

    /// Remember that a created quiz was played. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the id list cannot be stored.
    async fn mark_completed(&self, id: QuizId) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<StorageKey, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&key);
        Ok(())
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub accounts: Arc<dyn AccountRepository>,
    pub stats: Arc<dyn StatsRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub leaderboard: Arc<dyn LeaderboardRepository>,
    pub created_quizzes: Arc<dyn CreatedQuizRepository>,
}

impl Storage {
    /// Build every repository on top of one key-value backend.
    #[must_use]
    pub fn from_store(kv: Arc<dyn KeyValueStore>) -> Self {
        let repo = JsonRepository::new(Arc::clone(&kv));
        let accounts: Arc<dyn AccountRepository> = Arc::new(repo.clone());
        let stats: Arc<dyn StatsRepository> = Arc::new(repo.clone());
        let results: Arc<dyn ResultRepository> = Arc::new(repo.clone());
        let leaderboard: Arc<dyn LeaderboardRepository> = Arc::new(repo.clone());
        let created_quizzes: Arc<dyn CreatedQuizRepository> = Arc::new(repo);
        Self {
            kv,
            accounts,
            stats,
            results,
            leaderboard,
            created_quizzes,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_use_stable_names() {
        let names: Vec<_> = StorageKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            [
                "quizUser",
                "quizUserStats",
                "quizResults",
                "leaderboard",
                "createdQuizzes",
                "completedQuizIds"
            ]
        );
    }

    #[tokio::test]
    async fn in_memory_store_sets_and_removes() {
        let store = InMemoryStore::new();
        assert_eq!(store.get(StorageKey::CurrentUser).await.unwrap(), None);

        store.set(StorageKey::CurrentUser, "ada").await.unwrap();
        assert_eq!(
            store.get(StorageKey::CurrentUser).await.unwrap().as_deref(),
            Some("ada")
        );

        store.remove(StorageKey::CurrentUser).await.unwrap();
        store.remove(StorageKey::CurrentUser).await.unwrap();
        assert_eq!(store.get(StorageKey::CurrentUser).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.set(StorageKey::Leaderboard, "[]").await.unwrap();
        assert!(other.get(StorageKey::Leaderboard).await.unwrap().is_some());
    }
}
