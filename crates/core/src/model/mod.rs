pub mod achievement;
mod answers;
mod created_quiz;
mod ids;
mod leaderboard;
mod question;
mod result;
mod settings;
mod stats;

pub use achievement::{Achievement, AchievementRule};
pub use answers::AnswerRecord;
pub use created_quiz::{
    CUSTOM_CATEGORY, CreatedQuestionInput, CreatedQuiz, CreatedQuizDraft, CreatedQuizError,
    MAX_CREATED_QUIZ_QUESTIONS,
};
pub use ids::{ParseIdError, QuestionId, QuizId};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use question::{DEFAULT_QUESTION_POINTS, Difficulty, Question, QuestionDraft, QuestionError};
pub use result::{QuizResult, accuracy_percent};
pub use settings::{QuizSettings, QuizSettingsError};
pub use stats::{QuizRewards, UserStats, XP_PER_LEVEL};
