//! Quiz session state machine.
//!
//! A [`QuizSession`] walks one quiz attempt through
//! `Idle → Loading → Answering ⇄ Revealing → Completed`. It never sleeps or
//! spawns anything: every operation returns a [`Transition`] listing the events
//! for the embedding application and the [`SessionEffect`]s the driver must carry
//! out (start or stop the per-second ticker, schedule or cancel the reveal delay).
//! Scheduled callbacks come back with the token they were issued with; tokens
//! that have been superseded are ignored.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::model::{AnswerRecord, Question, QuestionId, accuracy_percent};
use crate::timer::{CountdownTimer, DEFAULT_QUESTION_SECS, TickOutcome, TickToken, TimerState};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A rejected operation. The session is left exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {action} while {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: SessionPhase,
    },

    #[error("question {0} was already answered")]
    AlreadyAnswered(QuestionId),

    #[error("question id {0} appears more than once")]
    DuplicateQuestion(QuestionId),

    #[error("no current question")]
    NoCurrentQuestion,

    #[error("answer for question {answered} arrived after moving on to {current}")]
    StaleQuestion {
        answered: QuestionId,
        current: QuestionId,
    },
}

//
// ─── PHASES, EVENTS, EFFECTS ───────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Idle,
    Loading,
    Answering,
    Revealing,
    Completed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Loading => "loading",
            SessionPhase::Answering => "answering",
            SessionPhase::Revealing => "revealing",
            SessionPhase::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Identifies one scheduled reveal delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealToken(u64);

/// Work the driver must schedule or cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    /// Call [`QuizSession::tick`] with this token once per second.
    StartTicking(TickToken),
    StopTicking,
    /// Call [`QuizSession::reveal_elapsed`] with this token after the reveal delay.
    ScheduleReveal(RevealToken),
    CancelReveal,
}

/// The scoring decision for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvent {
    pub question_id: QuestionId,
    /// `None` when the timer ran out.
    pub answer: Option<String>,
    pub is_correct: bool,
}

impl AnswerEvent {
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.answer.is_none()
    }
}

/// Summary emitted once when a session completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub score: u32,
    pub answers: AnswerRecord,
    pub questions: Arc<[Question]>,
}

impl SessionOutcome {
    #[must_use]
    pub fn correct_count(&self) -> u32 {
        u32::try_from(self.answers.correct_count(&self.questions)).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn accuracy(&self) -> u32 {
        accuracy_percent(self.correct_count(), self.total_questions())
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        !self.questions.is_empty() && self.correct_count() == self.total_questions()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    QuestionStarted { index: usize, question_id: QuestionId },
    Tick { remaining: u32 },
    Answered(AnswerEvent),
    Skipped { question_id: QuestionId },
    Completed(SessionOutcome),
}

/// Everything one operation produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub events: Vec<SessionEvent>,
    pub effects: Vec<SessionEffect>,
}

impl Transition {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.effects.is_empty()
    }

    #[must_use]
    pub fn tick_token(&self) -> Option<TickToken> {
        self.effects.iter().find_map(|effect| match effect {
            SessionEffect::StartTicking(token) => Some(*token),
            _ => None,
        })
    }

    #[must_use]
    pub fn reveal_token(&self) -> Option<RevealToken> {
        self.effects.iter().find_map(|effect| match effect {
            SessionEffect::ScheduleReveal(token) => Some(*token),
            _ => None,
        })
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.events.iter().find_map(|event| match event {
            SessionEvent::Completed(outcome) => Some(outcome),
            _ => None,
        })
    }
}

/// Read-only view for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current_index: usize,
    pub total_questions: usize,
    pub score: u32,
    pub answered: usize,
    pub timer: TimerState,
    pub question: Option<Question>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Arc<[Question]>,
    current_index: usize,
    answers: AnswerRecord,
    score: u32,
    phase: SessionPhase,
    timer: CountdownTimer,
    question_secs: u32,
    pending_reveal: Option<RevealToken>,
    reveal_seq: u64,
}

impl QuizSession {
    #[must_use]
    pub fn new(question_secs: u32) -> Self {
        Self {
            questions: Arc::from(Vec::new()),
            current_index: 0,
            answers: AnswerRecord::new(),
            score: 0,
            phase: SessionPhase::Idle,
            timer: CountdownTimer::new(question_secs),
            question_secs,
            pending_reveal: None,
            reveal_seq: 0,
        }
    }

    /// Enter `Loading` while the caller fetches questions.
    ///
    /// Clears any previous attempt and cancels its pending callbacks.
    pub fn begin_loading(&mut self) -> Transition {
        let mut t = Transition::default();
        self.halt(&mut t);
        self.questions = Arc::from(Vec::new());
        self.current_index = 0;
        self.answers.clear();
        self.score = 0;
        self.phase = SessionPhase::Loading;
        t
    }

    /// Start a new attempt over `questions`.
    ///
    /// Accepted from any phase; a running attempt is superseded. An empty list
    /// completes immediately with score 0.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DuplicateQuestion` if two questions share an id.
    /// Sources validate ids when they build the list; this check only keeps a
    /// bad list from reaching the answer record.
    pub fn start(&mut self, questions: Vec<Question>) -> Result<Transition, SessionError> {
        let mut seen = HashSet::with_capacity(questions.len());
        if let Some(dup) = questions.iter().find(|q| !seen.insert(q.id())) {
            return Err(SessionError::DuplicateQuestion(dup.id()));
        }

        let mut t = self.begin_loading();
        self.questions = Arc::from(questions);
        if self.questions.is_empty() {
            self.complete(&mut t);
        } else {
            self.enter_question(0, &mut t);
        }
        Ok(t)
    }

    /// Record the player's answer to the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless the session is `Answering`;
    /// a second submission for the same question lands here because the first
    /// one already moved the session to `Revealing`.
    pub fn submit_answer(&mut self, answer: impl Into<String>) -> Result<Transition, SessionError> {
        self.expect_phase(SessionPhase::Answering, "submit an answer")?;
        let question = self
            .questions
            .get(self.current_index)
            .ok_or(SessionError::NoCurrentQuestion)?;
        let question_id = question.id();
        if self.answers.contains(question_id) {
            return Err(SessionError::AlreadyAnswered(question_id));
        }

        let answer = answer.into();
        let is_correct = question.is_correct(&answer);
        let points = question.points();

        let mut t = Transition::default();
        if self.timer.pause() {
            t.effects.push(SessionEffect::StopTicking);
        }
        self.answers.record(question_id, answer.clone());
        if is_correct {
            self.score = self.score.saturating_add(points);
        }
        t.events.push(SessionEvent::Answered(AnswerEvent {
            question_id,
            answer: Some(answer),
            is_correct,
        }));
        self.enter_reveal(&mut t);
        Ok(t)
    }

    /// [`submit_answer`](Self::submit_answer) for the question the player was
    /// looking at. Rejected if the session has already moved past it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleQuestion` when `question_id` is not the
    /// current question, otherwise as `submit_answer`.
    pub fn answer_question(
        &mut self,
        question_id: QuestionId,
        answer: impl Into<String>,
    ) -> Result<Transition, SessionError> {
        self.expect_phase(SessionPhase::Answering, "submit an answer")?;
        let current = self
            .current_question()
            .ok_or(SessionError::NoCurrentQuestion)?
            .id();
        if current != question_id {
            return Err(SessionError::StaleQuestion {
                answered: question_id,
                current,
            });
        }
        self.submit_answer(answer)
    }

    /// Deliver one timer tick. Stale tokens produce an empty transition.
    pub fn tick(&mut self, token: TickToken) -> Transition {
        let mut t = Transition::default();
        match self.timer.tick(token) {
            TickOutcome::Stale => {}
            TickOutcome::Ticked { remaining } => {
                t.events.push(SessionEvent::Tick { remaining });
            }
            TickOutcome::Expired => {
                t.events.push(SessionEvent::Tick { remaining: 0 });
                if self.phase == SessionPhase::Answering {
                    self.time_out(&mut t);
                }
            }
        }
        t
    }

    /// The reveal delay scheduled with `token` has elapsed.
    ///
    /// Moves to the next question (or completes). Ignored if the reveal was
    /// superseded by `advance`, `start` or `abandon`.
    pub fn reveal_elapsed(&mut self, token: RevealToken) -> Transition {
        let mut t = Transition::default();
        if self.phase != SessionPhase::Revealing || self.pending_reveal != Some(token) {
            return t;
        }
        self.pending_reveal = None;
        self.move_next(&mut t);
        t
    }

    /// Leave the reveal early and move on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless the current question has been
    /// answered or timed out and the session is `Revealing`.
    pub fn advance(&mut self) -> Result<Transition, SessionError> {
        self.expect_phase(SessionPhase::Revealing, "advance")?;
        let mut t = Transition::default();
        if self.pending_reveal.take().is_some() {
            t.effects.push(SessionEffect::CancelReveal);
        }
        self.move_next(&mut t);
        Ok(t)
    }

    /// Move past the current question without answering it. Never scores.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless the session is `Answering`.
    pub fn skip(&mut self) -> Result<Transition, SessionError> {
        self.expect_phase(SessionPhase::Answering, "skip")?;
        let question_id = self
            .questions
            .get(self.current_index)
            .map(Question::id)
            .ok_or(SessionError::NoCurrentQuestion)?;

        let mut t = Transition::default();
        if self.timer.is_running() {
            t.effects.push(SessionEffect::StopTicking);
        }
        self.timer.reset(Some(self.question_secs));
        t.events.push(SessionEvent::Skipped { question_id });
        self.move_next(&mut t);
        Ok(t)
    }

    /// Drop the current attempt and return to `Idle` without a `Completed` event.
    pub fn abandon(&mut self) -> Transition {
        let t = self.begin_loading();
        self.phase = SessionPhase::Idle;
        t
    }

    // ── accessors ──────────────────────────────────────────────────────────────

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            SessionPhase::Answering | SessionPhase::Revealing => {
                self.questions.get(self.current_index)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn timer(&self) -> TimerState {
        self.timer.state()
    }

    /// Token of the running countdown, if any.
    #[must_use]
    pub fn tick_token(&self) -> Option<TickToken> {
        self.timer.token()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            current_index: self.current_index,
            total_questions: self.questions.len(),
            score: self.score,
            answered: self.answers.len(),
            timer: self.timer.state(),
            question: self.current_question().cloned(),
        }
    }

    // ── internals ──────────────────────────────────────────────────────────────

    fn expect_phase(&self, phase: SessionPhase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase {
                action,
                phase: self.phase,
            })
        }
    }

    /// Stop the countdown and drop any pending reveal.
    fn halt(&mut self, t: &mut Transition) {
        if self.timer.is_running() {
            t.effects.push(SessionEffect::StopTicking);
        }
        self.timer.reset(Some(self.question_secs));
        if self.pending_reveal.take().is_some() {
            t.effects.push(SessionEffect::CancelReveal);
        }
    }

    fn time_out(&mut self, t: &mut Transition) {
        let Some(question) = self.questions.get(self.current_index) else {
            return;
        };
        t.events.push(SessionEvent::Answered(AnswerEvent {
            question_id: question.id(),
            answer: None,
            is_correct: false,
        }));
        self.enter_reveal(t);
    }

    fn enter_question(&mut self, index: usize, t: &mut Transition) {
        self.current_index = index;
        self.phase = SessionPhase::Answering;
        self.timer.reset(Some(self.question_secs));
        if let Some(token) = self.timer.start() {
            t.effects.push(SessionEffect::StartTicking(token));
        }
        if let Some(question) = self.questions.get(index) {
            t.events.push(SessionEvent::QuestionStarted {
                index,
                question_id: question.id(),
            });
        }
    }

    fn enter_reveal(&mut self, t: &mut Transition) {
        self.phase = SessionPhase::Revealing;
        self.reveal_seq += 1;
        let token = RevealToken(self.reveal_seq);
        self.pending_reveal = Some(token);
        t.effects.push(SessionEffect::ScheduleReveal(token));
    }

    fn move_next(&mut self, t: &mut Transition) {
        let next = self.current_index + 1;
        if next >= self.questions.len() {
            self.complete(t);
        } else {
            self.enter_question(next, t);
        }
    }

    fn complete(&mut self, t: &mut Transition) {
        if self.phase == SessionPhase::Completed {
            return;
        }
        self.halt(t);
        self.current_index = self.questions.len();
        self.phase = SessionPhase::Completed;
        t.events.push(SessionEvent::Completed(SessionOutcome {
            score: self.score,
            answers: self.answers.clone(),
            questions: Arc::clone(&self.questions),
        }));
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new(DEFAULT_QUESTION_SECS)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
