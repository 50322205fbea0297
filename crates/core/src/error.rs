use thiserror::Error;

use crate::model::{CreatedQuizError, ParseIdError, QuestionError, QuizSettingsError};
use crate::session::SessionError;

/// Any error raised by the domain layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    CreatedQuiz(#[from] CreatedQuizError),
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
