use std::sync::Arc;

use log::debug;
use quiz_core::model::LeaderboardEntry;
use storage::repository::{LeaderboardRepository, StorageError};

/// Local high scores, best score per player.
#[derive(Clone)]
pub struct LeaderboardService {
    board: Arc<dyn LeaderboardRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(board: Arc<dyn LeaderboardRepository>) -> Self {
        Self { board }
    }

    /// Record `score` for `name`. Returns `true` for a new personal best.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the leaderboard cannot be loaded or saved.
    pub async fn record(&self, name: &str, score: u32) -> Result<bool, StorageError> {
        let mut board = self.board.load_leaderboard().await?;
        if !board.record(name, score) {
            return Ok(false);
        }
        self.board.save_leaderboard(&board).await?;
        debug!("new best for {name}: {score}");
        Ok(true)
    }

    /// Entries sorted best first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the leaderboard cannot be loaded.
    pub async fn ranked(&self) -> Result<Vec<LeaderboardEntry>, StorageError> {
        Ok(self.board.load_leaderboard().await?.ranked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::Storage;

    #[tokio::test]
    async fn keeps_best_and_ranks() {
        let storage = Storage::in_memory();
        let svc = LeaderboardService::new(Arc::clone(&storage.leaderboard));

        assert!(svc.record("ada", 30).await.unwrap());
        assert!(!svc.record("ada", 20).await.unwrap());
        assert!(svc.record("bob", 50).await.unwrap());

        let ranked = svc.ranked().await.unwrap();
        assert_eq!(ranked[0].name, "bob");
        assert_eq!(ranked[1].score, 30);
    }
}
