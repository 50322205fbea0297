use chrono::Duration;
use log::info;
use quiz_core::Clock;
use quiz_core::model::achievement;
use services::{AppServices, DEFAULT_UPCOMING_WINDOW_SECS};

mod args;
mod terminal;

use args::{Args, ArgsError, Command, print_usage};

/// Quizzes listed by `history`.
const HISTORY_LIMIT: usize = 10;

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let env = |name: &str| std::env::var(name).ok();
    let parsed = Args::parse(argv, &env).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    info!("using database {}", parsed.db_url);
    let services = AppServices::new_sqlite(
        &parsed.db_url,
        Clock::default(),
        parsed.settings,
        &parsed.source,
    )
    .await?;

    match parsed.command {
        Command::Play { created } => terminal::play(&services, created).await?,
        Command::Login { name } => {
            let name = services.accounts().login(&name).await?;
            println!("Logged in as {name}.");
        }
        Command::Logout => {
            services.accounts().logout().await?;
            println!("Logged out.");
        }
        Command::Stats => {
            let stats = services.progress().current().await?;
            let user = services.accounts().current_user().await?;
            println!("Player:   {}", user.as_deref().unwrap_or("guest"));
            println!("Level:    {} ({} xp to next)", stats.level, stats.xp_to_next_level());
            println!("XP:       {}", stats.xp);
            println!("Coins:    {}", stats.coins);
            println!("Energy:   {}/{}", stats.energy, services.settings().max_energy());
            println!("Streak:   {} (best {})", stats.streak, stats.best_streak);
            println!("Quizzes:  {}", stats.total_quizzes);
            println!("Correct:  {}", stats.total_correct);
            if let Some(best) = services.results().best_score().await? {
                println!("Best:     {best}");
            }
        }
        Command::Achievements => {
            let stats = services.progress().current().await?;
            for item in achievement::catalog() {
                let mark = if stats.has_achievement(item.id) { "x" } else { " " };
                println!(
                    "[{mark}] {} {} - {} (+{} coins)",
                    item.icon, item.name, item.description, item.reward
                );
            }
        }
        Command::Leaderboard => {
            let entries = services.leaderboard().ranked().await?;
            if entries.is_empty() {
                println!("No scores yet.");
            }
            for (rank, entry) in entries.iter().enumerate() {
                println!("{:>3}. {:<20} {}", rank + 1, entry.name, entry.score);
            }
        }
        Command::History => {
            let results = services.results().recent(HISTORY_LIMIT).await?;
            if results.is_empty() {
                println!("No quizzes played yet.");
            }
            for result in results {
                println!(
                    "{}  score {:>4}  {}/{} ({}%)",
                    result.date.format("%Y-%m-%d %H:%M"),
                    result.score,
                    result.correct_answers,
                    result.total_questions,
                    result.accuracy
                );
            }
        }
        Command::Create { draft } => {
            let quiz = services.created_quizzes().create(draft).await?;
            println!(
                "Created \"{}\" with {} questions: {}",
                quiz.title,
                quiz.questions.len(),
                quiz.id
            );
        }
        Command::Scheduled => {
            let created = services.created_quizzes();
            let upcoming = created
                .upcoming(Duration::seconds(DEFAULT_UPCOMING_WINDOW_SECS))
                .await?;
            for quiz in &upcoming {
                println!("Starting soon: \"{}\" ({})", quiz.title, quiz.id);
            }
            let visible = created.visible().await?;
            if visible.is_empty() {
                println!("No created quizzes.");
            }
            for quiz in visible {
                let when = quiz.schedule_at.map_or_else(
                    || "unscheduled".to_owned(),
                    |at| at.format("%Y-%m-%d %H:%M UTC").to_string(),
                );
                println!("{}  {:<30} {when}", quiz.id, quiz.title);
            }
        }
    }
    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
