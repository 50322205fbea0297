use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use log::{debug, info};
use quiz_core::model::{Question, QuestionId, QuizSettings};
use quiz_core::session::{
    QuizSession, RevealToken, SessionError, SessionEffect, SessionEvent, SessionSnapshot,
    Transition,
};
use quiz_core::timer::TickToken;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Timing for a [`QuizRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    pub question_secs: u32,
    pub tick_interval: Duration,
    pub reveal_delay: Duration,
}

impl RunnerConfig {
    #[must_use]
    pub fn from_settings(settings: &QuizSettings) -> Self {
        Self {
            question_secs: settings.question_secs(),
            tick_interval: Duration::from_secs(1),
            reveal_delay: settings.reveal_delay(),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::from_settings(&QuizSettings::standard())
    }
}

#[derive(Default)]
struct Tasks {
    ticker: Option<JoinHandle<()>>,
    reveal: Option<JoinHandle<()>>,
}

struct Inner {
    session: Mutex<QuizSession>,
    tasks: StdMutex<Tasks>,
    /// Set on drop; no task is spawned afterwards.
    closed: AtomicBool,
    events: mpsc::UnboundedSender<SessionEvent>,
    config: RunnerConfig,
}

/// Drives a [`QuizSession`] in real time.
///
/// User actions, ticks and reveal callbacks all go through one mutex, so the
/// session sees them one at a time. Events are delivered on the channel
/// returned by [`QuizRunner::new`]. Dropping the runner aborts its timers.
pub struct QuizRunner {
    inner: Arc<Inner>,
}

impl QuizRunner {
    #[must_use]
    pub fn new(config: RunnerConfig) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            session: Mutex::new(QuizSession::new(config.question_secs)),
            tasks: StdMutex::new(Tasks::default()),
            closed: AtomicBool::new(false),
            events,
            config,
        });
        (Self { inner }, rx)
    }

    #[must_use]
    pub fn config(&self) -> RunnerConfig {
        self.inner.config
    }

    pub async fn begin_loading(&self) -> SessionSnapshot {
        let mut session = self.inner.session.lock().await;
        let transition = session.begin_loading();
        self.inner.apply(transition);
        session.snapshot()
    }

    /// Start a new attempt, replacing any running one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DuplicateQuestion` if question ids repeat.
    pub async fn start(&self, questions: Vec<Question>) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.inner.session.lock().await;
        let transition = session.start(questions)?;
        self.inner.apply(transition);
        Ok(session.snapshot())
    }

    /// # Errors
    ///
    /// Returns `SessionError` if no question is awaiting an answer.
    pub async fn submit_answer(
        &self,
        answer: impl Into<String>,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.inner.session.lock().await;
        let transition = session.submit_answer(answer)?;
        self.inner.apply(transition);
        Ok(session.snapshot())
    }

    /// Answer `question_id`, rejecting the answer if the session has already
    /// moved on to another question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleQuestion` for a question that is no longer
    /// current, or any error of [`submit_answer`](Self::submit_answer).
    pub async fn answer_question(
        &self,
        question_id: QuestionId,
        answer: impl Into<String>,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.inner.session.lock().await;
        let transition = session.answer_question(question_id, answer)?;
        self.inner.apply(transition);
        Ok(session.snapshot())
    }

    /// # Errors
    ///
    /// Returns `SessionError` if no question is awaiting an answer.
    pub async fn skip(&self) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.inner.session.lock().await;
        let transition = session.skip()?;
        self.inner.apply(transition);
        Ok(session.snapshot())
    }

    /// # Errors
    ///
    /// Returns `SessionError` unless the current question is being revealed.
    pub async fn advance(&self) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.inner.session.lock().await;
        let transition = session.advance()?;
        self.inner.apply(transition);
        Ok(session.snapshot())
    }

    pub async fn abandon(&self) -> SessionSnapshot {
        let mut session = self.inner.session.lock().await;
        let transition = session.abandon();
        self.inner.apply(transition);
        session.snapshot()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.session.lock().await.snapshot()
    }
}

impl Drop for QuizRunner {
    fn drop(&mut self) {
        let mut tasks = self.inner.lock_tasks();
        self.inner.closed.store(true, Ordering::SeqCst);
        for handle in [tasks.ticker.take(), tasks.reveal.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

impl Inner {
    fn lock_tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Carry out effects, then publish events. Called with the session locked.
    fn apply(self: &Arc<Self>, transition: Transition) {
        {
            let mut tasks = self.lock_tasks();
            if self.closed.load(Ordering::SeqCst) {
                debug!("runner closed, ignoring {} effects", transition.effects.len());
                return;
            }
            for effect in transition.effects {
                match effect {
                    SessionEffect::StartTicking(token) => {
                        let handle = spawn_ticker(self, token);
                        if let Some(old) = tasks.ticker.replace(handle) {
                            old.abort();
                        }
                    }
                    SessionEffect::StopTicking => {
                        if let Some(old) = tasks.ticker.take() {
                            old.abort();
                        }
                    }
                    SessionEffect::ScheduleReveal(token) => {
                        let handle = spawn_reveal(self, token);
                        if let Some(old) = tasks.reveal.replace(handle) {
                            old.abort();
                        }
                    }
                    SessionEffect::CancelReveal => {
                        if let Some(old) = tasks.reveal.take() {
                            old.abort();
                        }
                    }
                }
            }
        }

        for event in transition.events {
            match &event {
                SessionEvent::Tick { .. } => {}
                SessionEvent::Completed(outcome) => info!(
                    "quiz completed: score {} ({}/{} correct)",
                    outcome.score,
                    outcome.correct_count(),
                    outcome.total_questions()
                ),
                other => debug!("session event: {other:?}"),
            }
            if self.events.send(event).is_err() {
                debug!("session event dropped, receiver closed");
            }
        }
    }

    /// Returns `false` once the ticker that owns `token` should stop.
    async fn deliver_tick(self: &Arc<Self>, token: TickToken) -> bool {
        let mut session = self.session.lock().await;
        let transition = session.tick(token);
        self.apply(transition);
        session.tick_token() == Some(token)
    }

    async fn deliver_reveal(self: &Arc<Self>, token: RevealToken) {
        let mut session = self.session.lock().await;
        let transition = session.reveal_elapsed(token);
        self.apply(transition);
    }
}

fn spawn_ticker(inner: &Arc<Inner>, token: TickToken) -> JoinHandle<()> {
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        let period = inner.config.tick_interval;
        let mut interval = time::interval_at(Instant::now() + period, period);
        loop {
            interval.tick().await;
            if !inner.deliver_tick(token).await {
                break;
            }
        }
    })
}

fn spawn_reveal(inner: &Arc<Inner>, token: RevealToken) -> JoinHandle<()> {
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        time::sleep(inner.config.reveal_delay).await;
        inner.deliver_reveal(token).await;
    })
}
