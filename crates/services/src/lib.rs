#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod created_quiz_service;
pub mod error;
pub mod leaderboard_service;
pub mod result_service;
pub mod sessions;
pub mod sources;

pub use quiz_core::Clock;

pub use account_service::AccountService;
pub use app_services::{AppServices, SourceConfig};
pub use created_quiz_service::{CreatedQuizService, DEFAULT_UPCOMING_WINDOW_SECS};
pub use error::{
    AccountError, AppServicesError, CreatedQuizServiceError, ProgressError, QuestionSourceError,
    QuizFlowError,
};
pub use leaderboard_service::LeaderboardService;
pub use result_service::ResultService;
pub use sessions::{
    ProgressService, ProgressUpdate, QuizFlowService, QuizReport, QuizRunner, QuizStart,
    RunnerConfig,
};
pub use sources::{FallbackSource, QuestionSource, StaticQuestionBank, TriviaApiSource};
