//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{CreatedQuizError, QuestionError, QuestionId, QuizSettingsError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by question sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("question bank is not valid JSON: {0}")]
    Bank(#[from] serde_json::Error),
    #[error("question {index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
    #[error("question id {0} appears more than once")]
    DuplicateId(QuestionId),
    #[error("invalid trivia url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("trivia request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("trivia api answered with response code {0}")]
    Api(i64),
    #[error("trivia api returned no questions")]
    Empty,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AccountService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountError {
    #[error("user name cannot be empty")]
    EmptyName,
    #[error("no user is logged in")]
    NotLoggedIn,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CreatedQuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CreatedQuizServiceError {
    #[error(transparent)]
    CreatedQuiz(#[from] CreatedQuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the quiz flow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error("out of energy, next point in {seconds_until_refill}s")]
    OutOfEnergy { seconds_until_refill: u32 },
    #[error(transparent)]
    Source(#[from] QuestionSourceError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
    #[error(transparent)]
    Source(#[from] QuestionSourceError),
}
