//! Interactive quiz play on stdin/stdout.

use log::debug;
use quiz_core::model::{Question, QuestionId, QuizId, QuizResult};
use quiz_core::session::{AnswerEvent, SessionEvent, SessionOutcome, SessionPhase};
use services::sources::shuffled_choices;
use services::{AppServices, QuizFlowError, QuizReport, QuizRunner};
use tokio::io::{AsyncBufReadExt, BufReader};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

/// What one line of player input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Choice(usize),
    Skip,
    Next,
    Quit,
    Unknown,
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "s" | "skip" => Self::Skip,
            "n" | "next" | "" => Self::Next,
            "q" | "quit" => Self::Quit,
            other => other
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map_or(Self::Unknown, |n| Self::Choice(n - 1)),
        }
    }
}

/// The question currently on screen with its shuffled choices.
struct Shown {
    question: Question,
    choices: Vec<String>,
}

impl Shown {
    /// The choice at `index`, tagged with the question it was shown for.
    fn choice(&self, index: usize) -> Option<(QuestionId, &str)> {
        self.choices
            .get(index)
            .map(|choice| (self.question.id(), choice.as_str()))
    }
}

/// Play one quiz to completion or until the player quits.
pub async fn play(services: &AppServices, created: Option<QuizId>) -> AppResult<()> {
    let player = services.accounts().current_user().await?;
    let flow = services.quiz_flow();

    let (runner, mut events) = services.runner();
    runner.begin_loading().await;

    let start = match created {
        Some(id) => flow.begin_created(id).await,
        None => flow.begin().await,
    };
    let start = match start {
        Ok(start) => start,
        Err(QuizFlowError::OutOfEnergy {
            seconds_until_refill,
        }) => {
            runner.abandon().await;
            println!("Out of energy. Next point in {seconds_until_refill}s.");
            return Ok(());
        }
        Err(err) => {
            runner.abandon().await;
            return Err(err.into());
        }
    };

    if !services.settings().premium() && created.is_none() {
        println!("Energy left: {}", start.stats.energy);
    }
    println!(
        "{} questions, {}s each. Type a number to answer, s to skip, n for next, q to quit.",
        start.questions.len(),
        services.settings().question_secs()
    );
    runner.start(start.questions).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown: Option<Shown> = None;

    loop {
        tokio::select! {
            // pending session events first, so input is read against the question on screen
            biased;
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    SessionEvent::QuestionStarted { index, .. } => {
                        let snapshot = runner.snapshot().await;
                        if let Some(question) = snapshot.question {
                            let next = Shown {
                                choices: shuffled_choices(&question),
                                question,
                            };
                            print_question(index, snapshot.total_questions, &next);
                            shown = Some(next);
                        }
                    }
                    SessionEvent::Tick { remaining } => {
                        if remaining == 10 || (1..=5).contains(&remaining) {
                            println!("  {remaining}s left");
                        }
                    }
                    SessionEvent::Answered(answer) => print_answer(&answer, shown.as_ref()),
                    SessionEvent::Skipped { .. } => println!("  skipped"),
                    SessionEvent::Completed(outcome) => {
                        let report = finish(services, created, player.as_deref(), &outcome).await?;
                        print_report(&report);
                        break;
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    runner.abandon().await;
                    break;
                };
                if handle_input(&runner, Input::parse(&line), shown.as_ref()).await {
                    println!("Quiz abandoned.");
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Returns `true` when the player quit.
async fn handle_input(runner: &QuizRunner, input: Input, shown: Option<&Shown>) -> bool {
    let result = match input {
        Input::Quit => {
            runner.abandon().await;
            return true;
        }
        Input::Choice(index) => match shown.and_then(|s| s.choice(index)) {
            Some((question_id, choice)) => runner
                .answer_question(question_id, choice)
                .await
                .map(drop),
            None => {
                println!("  no such choice");
                return false;
            }
        },
        Input::Skip => runner.skip().await.map(drop),
        Input::Next => {
            if runner.snapshot().await.phase != SessionPhase::Revealing {
                return false;
            }
            runner.advance().await.map(drop)
        }
        Input::Unknown => {
            println!("  enter a choice number, s, n or q");
            return false;
        }
    };
    if let Err(err) = result {
        // late input after a timeout or reveal is harmless
        debug!("input ignored: {err}");
        println!("  {err}");
    }
    false
}

async fn finish(
    services: &AppServices,
    created: Option<QuizId>,
    player: Option<&str>,
    outcome: &SessionOutcome,
) -> Result<QuizReport, QuizFlowError> {
    let flow = services.quiz_flow();
    match created {
        Some(id) => flow.finish_created(id, player, outcome).await,
        None => flow.finish(player, outcome).await,
    }
}

fn print_question(index: usize, total: usize, shown: &Shown) {
    let question = &shown.question;
    println!();
    println!(
        "Question {}/{} [{} · {}]",
        index + 1,
        total,
        question.category(),
        question.difficulty().as_str()
    );
    println!("{}", question.prompt());
    for (n, choice) in shown.choices.iter().enumerate() {
        println!("  {}) {choice}", n + 1);
    }
}

fn print_answer(answer: &AnswerEvent, shown: Option<&Shown>) {
    let correct = shown.map_or("?", |s| s.question.correct_answer());
    if answer.timed_out() {
        println!("  Time's up! The answer was {correct}.");
    } else if answer.is_correct {
        println!("  Correct!");
    } else {
        println!("  Wrong, the answer was {correct}.");
    }
}

fn print_report(report: &QuizReport) {
    let result = &report.result;
    println!();
    println!(
        "Score {} · {}/{} correct ({}%)",
        result.score, result.correct_answers, result.total_questions, result.accuracy
    );
    println!(
        "+{} xp · +{} coins · streak {}",
        report.rewards.xp, report.rewards.coins, report.rewards.streak
    );
    if report.rewards.leveled_up {
        println!("Level up! You are now level {}.", report.stats.level);
    }
    for achievement in &report.unlocked {
        println!(
            "Achievement unlocked: {} {} (+{} coins)",
            achievement.icon, achievement.name, achievement.reward
        );
    }
    if report.personal_best {
        println!("New personal best!");
    }
    println!();
    for line in review_lines(result) {
        println!("{line}");
    }
}

/// One block per question: the player's answer and the correct one.
fn review_lines(result: &QuizResult) -> Vec<String> {
    let mut lines = Vec::with_capacity(result.questions.len() * 3);
    for (n, question) in result.questions.iter().enumerate() {
        let given = result.user_answers.get(question.id());
        let mark = match given {
            Some(answer) if question.is_correct(answer) => "✓",
            _ => "✗",
        };
        lines.push(format!("{mark} {}. {}", n + 1, question.prompt()));
        lines.push(format!("    Your answer: {}", given.unwrap_or("No answer")));
        lines.push(format!("    Correct answer: {}", question.correct_answer()));
    }
    lines
}
