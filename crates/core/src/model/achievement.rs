use serde::Serialize;

use crate::model::stats::UserStats;

/// Condition under which an achievement unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum AchievementRule {
    QuizzesPlayed(u32),
    CorrectAnswers(u32),
    Streak(u32),
    Level(u32),
    Coins(u32),
    Contests(u32),
}

impl AchievementRule {
    #[must_use]
    pub fn is_met(self, stats: &UserStats) -> bool {
        match self {
            AchievementRule::QuizzesPlayed(n) => stats.total_quizzes >= n,
            AchievementRule::CorrectAnswers(n) => stats.total_correct >= n,
            AchievementRule::Streak(n) => stats.best_streak >= n,
            AchievementRule::Level(n) => stats.level >= n,
            AchievementRule::Coins(n) => stats.coins >= n,
            AchievementRule::Contests(n) => stats.contests_entered >= n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub reward: u32,
    pub level: u32,
    pub rule: AchievementRule,
}

const CATALOG: &[Achievement] = &[
    Achievement {
        id: "first_quiz",
        name: "First Steps",
        description: "Complete your first quiz",
        icon: "🎯",
        reward: 10,
        level: 1,
        rule: AchievementRule::QuizzesPlayed(1),
    },
    Achievement {
        id: "quiz_regular",
        name: "Regular",
        description: "Complete 10 quizzes",
        icon: "📚",
        reward: 50,
        level: 2,
        rule: AchievementRule::QuizzesPlayed(10),
    },
    Achievement {
        id: "sharp_mind",
        name: "Sharp Mind",
        description: "Answer 50 questions correctly",
        icon: "🧠",
        reward: 75,
        level: 2,
        rule: AchievementRule::CorrectAnswers(50),
    },
    Achievement {
        id: "streak_3",
        name: "On Fire",
        description: "Play 3 days in a row",
        icon: "🔥",
        reward: 30,
        level: 1,
        rule: AchievementRule::Streak(3),
    },
    Achievement {
        id: "streak_7",
        name: "Week Warrior",
        description: "Play 7 days in a row",
        icon: "⚡",
        reward: 100,
        level: 3,
        rule: AchievementRule::Streak(7),
    },
    Achievement {
        id: "streak_30",
        name: "Unstoppable",
        description: "Play 30 days in a row",
        icon: "👑",
        reward: 500,
        level: 10,
        rule: AchievementRule::Streak(30),
    },
    Achievement {
        id: "level_5",
        name: "Scholar",
        description: "Reach level 5",
        icon: "🎓",
        reward: 150,
        level: 5,
        rule: AchievementRule::Level(5),
    },
    Achievement {
        id: "coins_500",
        name: "Treasure Hunter",
        description: "Hold 500 coins",
        icon: "💰",
        reward: 0,
        level: 3,
        rule: AchievementRule::Coins(500),
    },
    Achievement {
        id: "contender",
        name: "Contender",
        description: "Score points in 3 contests",
        icon: "🏆",
        reward: 40,
        level: 2,
        rule: AchievementRule::Contests(3),
    },
];

/// All achievements, in display order.
#[must_use]
pub fn catalog() -> &'static [Achievement] {
    CATALOG
}

#[must_use]
pub fn find(id: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.id == id)
}

/// Unlock every achievement whose rule now holds and credit its reward.
///
/// Rewards are credited one at a time, so a coin reward can make a coin
/// achievement later in the catalog reachable in the same pass. Already
/// unlocked ids are never added twice.
pub fn unlock_new(stats: &mut UserStats) -> Vec<&'static Achievement> {
    let mut unlocked = Vec::new();
    for achievement in CATALOG {
        if stats.has_achievement(achievement.id) || !achievement.rule.is_met(stats) {
            continue;
        }
        stats.achievements.push(achievement.id.to_owned());
        stats.coins = stats.coins.saturating_add(achievement.reward);
        unlocked.push(achievement);
    }
    unlocked
}
