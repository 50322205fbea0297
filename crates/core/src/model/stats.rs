use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Experience needed per level.
pub const XP_PER_LEVEL: u32 = 1_000;
/// Bonus coins for answering every question correctly.
pub const PERFECT_RUN_COINS: u32 = 50;
/// A streak this long lifts the level to at least [`STREAK_LEVEL_FLOOR`].
pub const LONG_STREAK_DAYS: u32 = 30;
pub const STREAK_LEVEL_FLOOR: u32 = 10;

/// Long-lived progress of the local player.
///
/// Persisted as JSON under `quizUserStats`; field names are camelCase so that
/// stored documents stay readable by the web front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total_quizzes: u32,
    pub total_correct: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub level: u32,
    pub xp: u32,
    pub coins: u32,
    pub energy: u32,
    pub achievements: Vec<String>,
    pub last_played: Option<NaiveDate>,
    pub contests_entered: u32,
    pub energy_refilled_at: Option<DateTime<Utc>>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_quizzes: 0,
            total_correct: 0,
            streak: 0,
            best_streak: 0,
            level: 1,
            xp: 0,
            coins: 100,
            energy: 5,
            achievements: Vec::new(),
            last_played: None,
            contests_entered: 0,
            energy_refilled_at: None,
        }
    }
}

/// What a finished quiz added to the stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizRewards {
    pub xp: u32,
    pub coins: u32,
    pub streak: u32,
    pub leveled_up: bool,
}

impl UserStats {
    /// Apply the outcome of one finished quiz.
    pub fn record_quiz(
        &mut self,
        score: u32,
        correct: u32,
        total: u32,
        today: NaiveDate,
    ) -> QuizRewards {
        self.streak = match self.last_played {
            Some(last) if last == today => self.streak.max(1),
            Some(last) if today.pred_opt() == Some(last) => self.streak.saturating_add(1),
            _ => 1,
        };
        self.best_streak = self.best_streak.max(self.streak);
        self.last_played = Some(today);

        let xp = score.saturating_add(correct.saturating_mul(10));
        let perfect = total > 0 && correct == total;
        let coins = score / 10 + if perfect { PERFECT_RUN_COINS } else { 0 };

        self.xp = self.xp.saturating_add(xp);
        self.coins = self.coins.saturating_add(coins);
        self.total_quizzes = self.total_quizzes.saturating_add(1);
        self.total_correct = self.total_correct.saturating_add(correct);
        if score > 0 {
            self.contests_entered = self.contests_entered.saturating_add(1);
        }

        let before = self.level;
        self.level = self.computed_level();

        QuizRewards {
            xp,
            coins,
            streak: self.streak,
            leveled_up: self.level > before,
        }
    }

    /// Level implied by xp and streak.
    #[must_use]
    pub fn computed_level(&self) -> u32 {
        let by_xp = 1 + self.xp / XP_PER_LEVEL;
        if self.streak >= LONG_STREAK_DAYS {
            by_xp.max(STREAK_LEVEL_FLOOR)
        } else {
            by_xp
        }
    }

    #[must_use]
    pub fn xp_to_next_level(&self) -> u32 {
        XP_PER_LEVEL - self.xp % XP_PER_LEVEL
    }

    /// Credit one energy point per elapsed `refill_secs`, up to `max`.
    ///
    /// Returns the number of points added.
    pub fn refill_energy(&mut self, now: DateTime<Utc>, max: u32, refill_secs: u32) -> u32 {
        let Some(since) = self.energy_refilled_at else {
            self.energy_refilled_at = Some(now);
            return 0;
        };
        if self.energy >= max || refill_secs == 0 {
            self.energy_refilled_at = Some(now);
            return 0;
        }

        let elapsed = (now - since).num_seconds().max(0);
        let steps = u32::try_from(elapsed / i64::from(refill_secs)).unwrap_or(u32::MAX);
        let gained = steps.min(max - self.energy);
        self.energy += gained;

        self.energy_refilled_at = if self.energy >= max {
            Some(now)
        } else {
            Some(since + Duration::seconds(i64::from(steps) * i64::from(refill_secs)))
        };
        gained
    }

    /// Spend one energy point; `false` when none is left.
    pub fn consume_energy(&mut self) -> bool {
        if self.energy == 0 {
            return false;
        }
        self.energy -= 1;
        true
    }

    #[must_use]
    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_quiz_starts_streak_and_awards_xp() {
        let mut stats = UserStats::default();
        let rewards = stats.record_quiz(20, 2, 3, day(2024, 5, 1));
        assert_eq!(rewards.xp, 40);
        assert_eq!(rewards.coins, 2);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.coins, 102);
        assert_eq!(stats.total_quizzes, 1);
        assert_eq!(stats.total_correct, 2);
        assert_eq!(stats.contests_entered, 1);
    }

    #[test]
    fn streak_grows_on_consecutive_days_and_resets_after_gap() {
        let mut stats = UserStats::default();
        stats.record_quiz(0, 0, 1, day(2024, 5, 1));
        stats.record_quiz(0, 0, 1, day(2024, 5, 1));
        assert_eq!(stats.streak, 1);
        stats.record_quiz(0, 0, 1, day(2024, 5, 2));
        assert_eq!(stats.streak, 2);
        stats.record_quiz(0, 0, 1, day(2024, 5, 5));
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.best_streak, 2);
    }

    #[test]
    fn perfect_run_earns_bonus() {
        let mut stats = UserStats::default();
        let rewards = stats.record_quiz(30, 3, 3, day(2024, 5, 1));
        assert_eq!(rewards.coins, 3 + PERFECT_RUN_COINS);
    }

    #[test]
    fn level_follows_xp_and_long_streaks() {
        let mut stats = UserStats {
            xp: 990,
            ..UserStats::default()
        };
        let rewards = stats.record_quiz(10, 1, 2, day(2024, 5, 1));
        assert!(rewards.leveled_up);
        assert_eq!(stats.level, 2);

        stats.streak = LONG_STREAK_DAYS;
        assert_eq!(stats.computed_level(), STREAK_LEVEL_FLOOR);
    }

    #[test]
    fn energy_refills_per_interval_up_to_max() {
        let start = fixed_now();
        let mut stats = UserStats {
            energy: 1,
            energy_refilled_at: Some(start),
            ..UserStats::default()
        };

        assert_eq!(stats.refill_energy(start + Duration::seconds(150), 5, 60), 2);
        assert_eq!(stats.energy, 3);
        // leftover 30s carry over
        assert_eq!(stats.energy_refilled_at, Some(start + Duration::seconds(120)));

        assert_eq!(stats.refill_energy(start + Duration::hours(1), 5, 60), 2);
        assert_eq!(stats.energy, 5);
    }

    #[test]
    fn consume_energy_stops_at_zero() {
        let mut stats = UserStats {
            energy: 1,
            ..UserStats::default()
        };
        assert!(stats.consume_energy());
        assert!(!stats.consume_energy());
        assert_eq!(stats.energy, 0);
    }

    #[test]
    fn stored_documents_use_camel_case() {
        let json = serde_json::to_value(UserStats::default()).unwrap();
        assert!(json.get("bestStreak").is_some());
        let partial: UserStats = serde_json::from_str(r#"{"coins": 7}"#).unwrap();
        assert_eq!(partial.coins, 7);
        assert_eq!(partial.level, 1);
    }
}
