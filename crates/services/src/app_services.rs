use std::sync::Arc;

use quiz_core::model::QuizSettings;
use quiz_core::session::SessionEvent;
use storage::repository::Storage;
use tokio::sync::mpsc;

use crate::Clock;
use crate::account_service::AccountService;
use crate::created_quiz_service::CreatedQuizService;
use crate::error::AppServicesError;
use crate::leaderboard_service::LeaderboardService;
use crate::result_service::ResultService;
use crate::sessions::{ProgressService, QuizFlowService, QuizRunner, RunnerConfig};
use crate::sources::{FallbackSource, QuestionSource, StaticQuestionBank, TriviaApiSource};

/// Where regular quizzes get their questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// Only the bundled bank.
    Bank,
    /// The trivia API, falling back to the bundled bank.
    Remote { base_url: String },
}

impl SourceConfig {
    /// Build the configured source.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Source` for an invalid bank or url.
    pub fn build(&self) -> Result<Arc<dyn QuestionSource>, AppServicesError> {
        let bank: Arc<dyn QuestionSource> = Arc::new(StaticQuestionBank::bundled()?);
        Ok(match self {
            SourceConfig::Bank => bank,
            SourceConfig::Remote { base_url } => {
                let remote: Arc<dyn QuestionSource> = Arc::new(TriviaApiSource::new(base_url)?);
                Arc::new(FallbackSource::new(remote, bank))
            }
        })
    }
}

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    settings: QuizSettings,
    accounts: Arc<AccountService>,
    leaderboard: Arc<LeaderboardService>,
    results: Arc<ResultService>,
    created_quizzes: Arc<CreatedQuizService>,
    progress: Arc<ProgressService>,
    quiz_flow: Arc<QuizFlowService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or source setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: QuizSettings,
        source: &SourceConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, settings, source.build()?))
    }

    /// Build services over an existing storage, e.g. `Storage::in_memory()`.
    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        settings: QuizSettings,
        source: Arc<dyn QuestionSource>,
    ) -> Self {
        let accounts = Arc::new(AccountService::new(Arc::clone(&storage.accounts)));
        let leaderboard = Arc::new(LeaderboardService::new(Arc::clone(&storage.leaderboard)));
        let results = Arc::new(ResultService::new(Arc::clone(&storage.results)));
        let created_quizzes = Arc::new(CreatedQuizService::new(
            clock,
            Arc::clone(&storage.created_quizzes),
        ));
        let progress = Arc::new(ProgressService::new(
            clock,
            settings.clone(),
            Arc::clone(&storage.stats),
        ));
        let quiz_flow = Arc::new(QuizFlowService::new(
            clock,
            settings.clone(),
            source,
            Arc::clone(&progress),
            Arc::clone(&storage.results),
            Arc::clone(&leaderboard),
            Arc::clone(&created_quizzes),
        ));

        Self {
            settings,
            accounts,
            leaderboard,
            results,
            created_quizzes,
            progress,
            quiz_flow,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// A fresh runner timed by the configured settings.
    #[must_use]
    pub fn runner(&self) -> (QuizRunner, mpsc::UnboundedReceiver<SessionEvent>) {
        QuizRunner::new(RunnerConfig::from_settings(&self.settings))
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultService> {
        Arc::clone(&self.results)
    }

    #[must_use]
    pub fn created_quizzes(&self) -> Arc<CreatedQuizService> {
        Arc::clone(&self.created_quizzes)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn quiz_flow(&self) -> Arc<QuizFlowService> {
        Arc::clone(&self.quiz_flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_source_requires_valid_url() {
        let bad = SourceConfig::Remote {
            base_url: "::nope".into(),
        };
        assert!(matches!(bad.build(), Err(AppServicesError::Source(_))));
        assert!(SourceConfig::Bank.build().is_ok());
    }
}
