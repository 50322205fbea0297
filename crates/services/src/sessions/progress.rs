use std::sync::Arc;

use log::debug;
use quiz_core::Clock;
use quiz_core::model::{Achievement, QuizRewards, QuizSettings, UserStats, achievement};
use storage::repository::StatsRepository;

use crate::error::ProgressError;

/// Stats after a finished quiz and what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub stats: UserStats,
    pub rewards: QuizRewards,
    pub unlocked: Vec<&'static Achievement>,
}

/// Applies the progress rules to the persisted `UserStats`.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    settings: QuizSettings,
    stats: Arc<dyn StatsRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, settings: QuizSettings, stats: Arc<dyn StatsRepository>) -> Self {
        Self {
            clock,
            settings,
            stats,
        }
    }

    /// Current stats with any energy earned since the last visit credited.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if stats cannot be loaded or saved.
    pub async fn current(&self) -> Result<UserStats, ProgressError> {
        let mut stats = self.stats.load_stats().await?;
        let before = stats.clone();
        let gained = stats.refill_energy(
            self.clock.now(),
            self.settings.max_energy(),
            self.settings.energy_refill_secs(),
        );
        if gained > 0 {
            debug!("refilled {gained} energy");
        }
        if stats != before {
            self.stats.save_stats(&stats).await?;
        }
        Ok(stats)
    }

    /// Spend one energy point. Returns the updated stats, or `None` when the
    /// player has none left.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if stats cannot be loaded or saved.
    pub async fn consume_energy(&self) -> Result<Option<UserStats>, ProgressError> {
        let mut stats = self.current().await?;
        if !stats.consume_energy() {
            return Ok(None);
        }
        self.stats.save_stats(&stats).await?;
        Ok(Some(stats))
    }

    /// Seconds until the next energy point, 0 when full.
    #[must_use]
    pub fn seconds_until_refill(&self, stats: &UserStats) -> u32 {
        if stats.energy >= self.settings.max_energy() {
            return 0;
        }
        let interval = i64::from(self.settings.energy_refill_secs());
        let elapsed = stats
            .energy_refilled_at
            .map_or(0, |at| (self.clock.now() - at).num_seconds().max(0));
        u32::try_from((interval - elapsed).clamp(0, interval)).unwrap_or(0)
    }

    /// Record a finished quiz and unlock achievements.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if stats cannot be loaded or saved.
    pub async fn record_quiz(
        &self,
        score: u32,
        correct: u32,
        total: u32,
    ) -> Result<ProgressUpdate, ProgressError> {
        let mut stats = self.current().await?;
        let rewards = stats.record_quiz(score, correct, total, self.clock.today());
        let unlocked = achievement::unlock_new(&mut stats);
        self.stats.save_stats(&stats).await?;
        debug!(
            "progress: +{} xp, +{} coins, streak {}, {} achievements unlocked",
            rewards.xp,
            rewards.coins,
            rewards.streak,
            unlocked.len()
        );
        Ok(ProgressUpdate {
            stats,
            rewards,
            unlocked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::fixed_now;
    use storage::Storage;

    fn service(clock: Clock) -> (Storage, ProgressService) {
        let storage = Storage::in_memory();
        let svc = ProgressService::new(clock, QuizSettings::standard(), Arc::clone(&storage.stats));
        (storage, svc)
    }

    #[tokio::test]
    async fn energy_is_spent_and_refilled() {
        let now = fixed_now();
        let (storage, svc) = service(Clock::fixed(now));
        let stats = UserStats {
            energy: 1,
            energy_refilled_at: Some(now),
            ..UserStats::default()
        };
        storage.stats.save_stats(&stats).await.unwrap();

        let stats = svc.consume_energy().await.unwrap().unwrap();
        assert_eq!(stats.energy, 0);
        assert!(svc.consume_energy().await.unwrap().is_none());
        assert_eq!(svc.seconds_until_refill(&stats), 60);

        let later = ProgressService::new(
            Clock::fixed(now + Duration::seconds(125)),
            QuizSettings::standard(),
            Arc::clone(&storage.stats),
        );
        assert_eq!(later.current().await.unwrap().energy, 2);
    }

    #[tokio::test]
    async fn first_quiz_unlocks_first_achievement() {
        let (_, svc) = service(Clock::fixed(fixed_now()));
        let update = svc.record_quiz(30, 3, 3).await.unwrap();

        assert_eq!(update.rewards.xp, 60);
        assert_eq!(update.stats.total_quizzes, 1);
        assert_eq!(update.stats.streak, 1);
        assert!(update.unlocked.iter().any(|a| a.id == "first_quiz"));
        assert!(update.stats.has_achievement("first_quiz"));

        // a second quiz does not unlock it again
        let again = svc.record_quiz(0, 0, 3).await.unwrap();
        assert!(again.unlocked.iter().all(|a| a.id != "first_quiz"));
    }

    #[tokio::test]
    async fn streak_continues_on_consecutive_days() {
        let now = fixed_now();
        let (storage, svc) = service(Clock::fixed(now));
        svc.record_quiz(10, 1, 5).await.unwrap();

        let tomorrow = ProgressService::new(
            Clock::fixed(now + Duration::days(1)),
            QuizSettings::standard(),
            Arc::clone(&storage.stats),
        );
        let update = tomorrow.record_quiz(10, 1, 5).await.unwrap();
        assert_eq!(update.stats.streak, 2);
    }
}
