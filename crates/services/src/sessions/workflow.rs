use std::sync::Arc;

use log::info;
use quiz_core::Clock;
use quiz_core::model::{
    Achievement, Question, QuizId, QuizResult, QuizRewards, QuizSettings, UserStats,
};
use quiz_core::session::SessionOutcome;
use storage::repository::ResultRepository;

use super::progress::ProgressService;
use crate::created_quiz_service::CreatedQuizService;
use crate::error::QuizFlowError;
use crate::leaderboard_service::LeaderboardService;
use crate::sources::QuestionSource;

/// Everything needed to start playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizStart {
    pub questions: Vec<Question>,
    pub stats: UserStats,
}

/// What a finished quiz produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizReport {
    pub result: QuizResult,
    pub stats: UserStats,
    pub rewards: QuizRewards,
    pub unlocked: Vec<&'static Achievement>,
    pub personal_best: bool,
}

/// Orchestrates quiz start (energy, question loading) and completion
/// (history, progress, achievements, leaderboard).
#[derive(Clone)]
pub struct QuizFlowService {
    clock: Clock,
    settings: QuizSettings,
    source: Arc<dyn QuestionSource>,
    progress: Arc<ProgressService>,
    results: Arc<dyn ResultRepository>,
    leaderboard: Arc<LeaderboardService>,
    created: Arc<CreatedQuizService>,
}

impl QuizFlowService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: QuizSettings,
        source: Arc<dyn QuestionSource>,
        progress: Arc<ProgressService>,
        results: Arc<dyn ResultRepository>,
        leaderboard: Arc<LeaderboardService>,
        created: Arc<CreatedQuizService>,
    ) -> Self {
        Self {
            clock,
            settings,
            source,
            progress,
            results,
            leaderboard,
            created,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Load questions for a regular quiz and pay its energy cost.
    ///
    /// Premium players play for free. Energy is only spent once questions
    /// were loaded.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::OutOfEnergy` when a free player has no energy,
    /// or a source/storage error.
    pub async fn begin(&self) -> Result<QuizStart, QuizFlowError> {
        let stats = self.progress.current().await?;
        let premium = self.settings.premium();
        if !premium && stats.energy == 0 {
            return Err(QuizFlowError::OutOfEnergy {
                seconds_until_refill: self.progress.seconds_until_refill(&stats),
            });
        }

        let questions = self.source.fetch(self.settings.question_count()).await?;

        let stats = if premium {
            stats
        } else {
            match self.progress.consume_energy().await? {
                Some(stats) => stats,
                None => {
                    return Err(QuizFlowError::OutOfEnergy {
                        seconds_until_refill: self.progress.seconds_until_refill(&stats),
                    });
                }
            }
        };
        Ok(QuizStart { questions, stats })
    }

    /// Load a created quiz. Created quizzes cost no energy.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Storage` for an unknown quiz.
    pub async fn begin_created(&self, id: QuizId) -> Result<QuizStart, QuizFlowError> {
        let questions = self.created.questions_for(id).await?;
        let stats = self.progress.current().await?;
        Ok(QuizStart { questions, stats })
    }

    /// Persist a finished quiz and apply its rewards.
    ///
    /// `player` is recorded on the leaderboard when present.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError` if anything cannot be stored.
    pub async fn finish(
        &self,
        player: Option<&str>,
        outcome: &SessionOutcome,
    ) -> Result<QuizReport, QuizFlowError> {
        let result = QuizResult::from_outcome(outcome, self.clock.now());
        self.results.append_result(&result).await?;

        let update = self
            .progress
            .record_quiz(result.score, result.correct_answers, result.total_questions)
            .await?;

        let personal_best = match player {
            Some(name) => self.leaderboard.record(name, result.score).await?,
            None => false,
        };

        info!(
            "quiz finished: score {}, accuracy {}%, +{} xp, +{} coins",
            result.score, result.accuracy, update.rewards.xp, update.rewards.coins
        );

        Ok(QuizReport {
            result,
            stats: update.stats,
            rewards: update.rewards,
            unlocked: update.unlocked,
            personal_best,
        })
    }

    /// [`finish`](Self::finish) for a created quiz, which is then hidden.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError` if anything cannot be stored.
    pub async fn finish_created(
        &self,
        id: QuizId,
        player: Option<&str>,
        outcome: &SessionOutcome,
    ) -> Result<QuizReport, QuizFlowError> {
        let report = self.finish(player, outcome).await?;
        self.created.mark_completed(id).await?;
        Ok(report)
    }
}
