use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{CreatedQuestionInput, CreatedQuizDraft, QuizSettings, UserStats};
use quiz_core::session::{QuizSession, SessionEvent, SessionOutcome};
use quiz_core::time::fixed_now;
use services::{AppServices, Clock, QuizFlowError, StaticQuestionBank};
use storage::Storage;

fn services(storage: &Storage, settings: QuizSettings) -> AppServices {
    let bank = StaticQuestionBank::bundled().unwrap().with_shuffle(false);
    AppServices::from_storage(storage, Clock::fixed(fixed_now()), settings, Arc::new(bank))
}

/// Answer every question correctly without timers.
fn play_perfect(questions: Vec<quiz_core::model::Question>) -> SessionOutcome {
    let mut session = QuizSession::new(30);
    let mut transition = session.start(questions).unwrap();
    while transition.outcome().is_none() {
        let answer = session.current_question().unwrap().correct_answer().to_owned();
        session.submit_answer(answer).unwrap();
        transition = session.advance().unwrap();
    }
    transition.outcome().unwrap().clone()
}

#[tokio::test]
async fn regular_quiz_updates_history_progress_and_leaderboard() {
    let storage = Storage::in_memory();
    let app = services(&storage, QuizSettings::standard());
    let player = app.accounts().login("ada").await.unwrap();

    let start = app.quiz_flow().begin().await.unwrap();
    assert_eq!(start.questions.len(), 5);
    assert_eq!(start.stats.energy, 4);

    let outcome = play_perfect(start.questions);
    assert_eq!(outcome.score, 50);

    let report = app.quiz_flow().finish(Some(&player), &outcome).await.unwrap();
    assert_eq!(report.result.accuracy, 100);
    assert_eq!(report.result.correct_answers, 5);
    assert_eq!(report.rewards.xp, 100);
    // 50 / 10 + perfect bonus
    assert_eq!(report.rewards.coins, 55);
    assert!(report.personal_best);
    assert!(report.unlocked.iter().any(|a| a.id == "first_quiz"));

    let history = app.results().recent(10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user_answers.len(), 5);

    let board = app.leaderboard().ranked().await.unwrap();
    assert_eq!(board[0].name, "ada");
    assert_eq!(board[0].score, 50);

    let stats = storage.stats.load_stats().await.unwrap();
    assert_eq!(stats.total_quizzes, 1);
    assert_eq!(stats.contests_entered, 1);
}

#[tokio::test]
async fn free_player_without_energy_is_refused() {
    let storage = Storage::in_memory();
    storage
        .stats
        .save_stats(&UserStats {
            energy: 0,
            energy_refilled_at: Some(fixed_now()),
            ..UserStats::default()
        })
        .await
        .unwrap();

    let app = services(&storage, QuizSettings::standard());
    let err = app.quiz_flow().begin().await.unwrap_err();
    assert!(matches!(
        err,
        QuizFlowError::OutOfEnergy {
            seconds_until_refill: 60
        }
    ));

    let premium = services(&storage, QuizSettings::standard().with_premium(true));
    let start = premium.quiz_flow().begin().await.unwrap();
    assert_eq!(start.questions.len(), 10);
    assert_eq!(start.stats.energy, 0);
}

#[tokio::test]
async fn created_quiz_is_hidden_after_playing() {
    let storage = Storage::in_memory();
    let app = services(&storage, QuizSettings::standard());

    let quiz = app
        .created_quizzes()
        .create(CreatedQuizDraft {
            title: "Colours".into(),
            questions: vec![
                CreatedQuestionInput::new("Sky colour?", "Blue", "Green, Red"),
                CreatedQuestionInput::new("Grass colour?", "Green", "Blue"),
            ],
            schedule_at: None,
        })
        .await
        .unwrap();

    let start = app.quiz_flow().begin_created(quiz.id).await.unwrap();
    assert_eq!(start.questions.len(), 2);
    // created quizzes are free
    assert_eq!(start.stats.energy, 5);

    let outcome = play_perfect(start.questions);
    app.quiz_flow()
        .finish_created(quiz.id, None, &outcome)
        .await
        .unwrap();

    assert!(app.created_quizzes().visible().await.unwrap().is_empty());
    assert!(app.leaderboard().ranked().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn runner_drives_a_timed_quiz_to_completion() {
    let storage = Storage::in_memory();
    let settings = QuizSettings::standard().with_question_secs(5).unwrap();
    let app = services(&storage, settings);

    let start = app.quiz_flow().begin().await.unwrap();
    let (runner, mut events) = app.runner();
    runner.start(start.questions).await.unwrap();

    // answer the first question, let the others time out
    let first = runner.snapshot().await.question.unwrap();
    runner.submit_answer(first.correct_answer()).await.unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(120), async {
        loop {
            match events.recv().await {
                Some(SessionEvent::Completed(outcome)) => break outcome,
                Some(_) => {}
                None => panic!("runner stopped before completion"),
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(outcome.score, 10);
    assert_eq!(outcome.answers.len(), 1);

    let report = app.quiz_flow().finish(Some("ada"), &outcome).await.unwrap();
    assert_eq!(report.result.accuracy, 20);
    assert_eq!(report.result.total_questions, 5);
}
