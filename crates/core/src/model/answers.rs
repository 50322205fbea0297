use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;
use crate::model::question::Question;

/// Answers given during one session, keyed by question id.
///
/// At most one answer per question. Questions that timed out or were skipped
/// have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerRecord(BTreeMap<QuestionId, String>);

impl AnswerRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer; returns `false` and keeps the existing one if the
    /// question was already answered.
    pub fn record(&mut self, question_id: QuestionId, answer: impl Into<String>) -> bool {
        if self.0.contains_key(&question_id) {
            return false;
        }
        self.0.insert(question_id, answer.into());
        true
    }

    #[must_use]
    pub fn get(&self, question_id: QuestionId) -> Option<&str> {
        self.0.get(&question_id).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, question_id: QuestionId) -> bool {
        self.0.contains_key(&question_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &str)> {
        self.0.iter().map(|(id, answer)| (*id, answer.as_str()))
    }

    /// Number of `questions` whose recorded answer is correct.
    #[must_use]
    pub fn correct_count(&self, questions: &[Question]) -> usize {
        questions
            .iter()
            .filter(|q| self.get(q.id()).is_some_and(|a| q.is_correct(a)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionDraft;

    fn question(id: u64, correct: &str) -> Question {
        QuestionDraft {
            id: QuestionId::new(id),
            category: String::new(),
            difficulty: Default::default(),
            prompt: format!("Q{id}"),
            correct_answer: correct.into(),
            incorrect_answers: vec!["nope".into()],
            points: 10,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn first_answer_wins() {
        let mut answers = AnswerRecord::new();
        assert!(answers.record(QuestionId::new(1), "X"));
        assert!(!answers.record(QuestionId::new(1), "Y"));
        assert_eq!(answers.get(QuestionId::new(1)), Some("X"));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn counts_correct_answers_only_for_known_questions() {
        let questions = vec![question(1, "a"), question(2, "b"), question(3, "c")];
        let mut answers = AnswerRecord::new();
        answers.record(QuestionId::new(1), "a");
        answers.record(QuestionId::new(2), "nope");
        answers.record(QuestionId::new(9), "z");
        assert_eq!(answers.correct_count(&questions), 1);
    }

    #[test]
    fn json_keys_are_question_ids() {
        let mut answers = AnswerRecord::new();
        answers.record(QuestionId::new(2), "b");
        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, r#"{"2":"b"}"#);
        let back: AnswerRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answers);
    }
}
