use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
}

/// Local high-score table: one entry per player holding their best score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard(Vec<LeaderboardEntry>);

impl Leaderboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a score, keeping the best one per name.
    ///
    /// Returns `true` if the player's best score changed.
    pub fn record(&mut self, name: &str, score: u32) -> bool {
        if let Some(entry) = self.0.iter_mut().find(|e| e.name == name) {
            if score > entry.score {
                entry.score = score;
                return true;
            }
            return false;
        }
        self.0.push(LeaderboardEntry {
            name: name.to_owned(),
            score,
        });
        true
    }

    #[must_use]
    pub fn best_for(&self, name: &str) -> Option<u32> {
        self.0.iter().find(|e| e.name == name).map(|e| e.score)
    }

    /// Entries sorted by score (descending), ties by name.
    #[must_use]
    pub fn ranked(&self) -> Vec<LeaderboardEntry> {
        let mut entries = self.0.clone();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
