use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::answers::AnswerRecord;
use crate::model::question::Question;
use crate::session::SessionOutcome;

/// A finished quiz as stored in the result history (`quizResults`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub date: DateTime<Utc>,
    pub score: u32,
    pub accuracy: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub user_answers: AnswerRecord,
    pub questions: Vec<Question>,
}

impl QuizResult {
    #[must_use]
    pub fn from_outcome(outcome: &SessionOutcome, date: DateTime<Utc>) -> Self {
        Self {
            date,
            score: outcome.score,
            accuracy: outcome.accuracy(),
            correct_answers: outcome.correct_count(),
            total_questions: outcome.total_questions(),
            user_answers: outcome.answers.clone(),
            questions: outcome.questions.to_vec(),
        }
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total_questions > 0 && self.correct_answers == self.total_questions
    }
}

/// Rounded percentage of `correct` over `total`; 0 for an empty quiz.
#[must_use]
pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let pct = (f64::from(correct) / f64::from(total) * 100.0).round();
    // bounded to 0..=100 by construction
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = pct as u32;
    pct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_rounds_to_nearest_percent() {
        assert_eq!(accuracy_percent(2, 3), 67);
        assert_eq!(accuracy_percent(1, 3), 33);
        assert_eq!(accuracy_percent(0, 0), 0);
        assert_eq!(accuracy_percent(5, 5), 100);
    }
}
