use std::fmt;

use chrono::{DateTime, Utc};
use quiz_core::model::{
    CreatedQuestionInput, CreatedQuizDraft, QuizId, QuizSettings, QuizSettingsError,
};
use services::SourceConfig;
use services::sources::DEFAULT_TRIVIA_URL;

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    MissingName,
    InvalidDbUrl { raw: String },
    InvalidNumber { name: &'static str, raw: String },
    InvalidQuizId { raw: String },
    InvalidSchedule { raw: String },
    InvalidQuestion { raw: String },
    Settings(QuizSettingsError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::MissingName => write!(f, "login requires a name"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNumber { name, raw } => write!(f, "invalid {name} value: {raw}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid quiz id: {raw}"),
            ArgsError::InvalidSchedule { raw } => {
                write!(f, "invalid --at value (expected RFC 3339): {raw}")
            }
            ArgsError::InvalidQuestion { raw } => write!(
                f,
                "invalid --question value (expected \"prompt|correct|wrong, wrong\"): {raw}"
            ),
            ArgsError::Settings(err) => write!(f, "invalid settings: {err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<QuizSettingsError> for ArgsError {
    fn from(err: QuizSettingsError) -> Self {
        ArgsError::Settings(err)
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [options] play [--created <quiz-id>]");
    eprintln!("  quiz [options] login <name>");
    eprintln!("  quiz [options] logout");
    eprintln!("  quiz [options] stats");
    eprintln!("  quiz [options] achievements");
    eprintln!("  quiz [options] leaderboard");
    eprintln!("  quiz [options] history");
    eprintln!("  quiz [options] create --title <title> [--at <rfc3339>]");
    eprintln!("                --question \"prompt|correct|wrong, wrong\"...");
    eprintln!("  quiz [options] scheduled");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>      default sqlite:quiz.sqlite3");
    eprintln!("  --remote               load questions from the trivia api");
    eprintln!("  --trivia-url <url>     default {DEFAULT_TRIVIA_URL}");
    eprintln!("  --premium              premium quiz length and no energy cost");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_REMOTE, QUIZ_TRIVIA_URL, QUIZ_PREMIUM,");
    eprintln!("  QUIZ_QUESTION_SECS, QUIZ_REVEAL_MS, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play { created: Option<QuizId> },
    Login { name: String },
    Logout,
    Stats,
    Achievements,
    Leaderboard,
    History,
    Create { draft: CreatedQuizDraft },
    Scheduled,
}

#[derive(Debug)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub source: SourceConfig,
    pub settings: QuizSettings,
}

/// Reads a variable through `lookup` so tests need not touch the process env.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn env_flag(env: EnvLookup<'_>, name: &str) -> bool {
    env(name).is_some_and(|value| value == "1" || value.eq_ignore_ascii_case("true"))
}

fn env_number(env: EnvLookup<'_>, name: &'static str) -> Result<Option<u32>, ArgsError> {
    env(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ArgsError::InvalidNumber { name, raw })
        })
        .transpose()
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    /// Parse `argv` (without the program name). Flags override environment.
    pub fn parse(argv: Vec<String>, env: EnvLookup<'_>) -> Result<Self, ArgsError> {
        let mut db_url = env("QUIZ_DB_URL").map_or_else(
            || normalize_sqlite_url("sqlite:quiz.sqlite3".into()),
            normalize_sqlite_url,
        );
        let mut remote = env_flag(env, "QUIZ_REMOTE");
        let mut trivia_url = env("QUIZ_TRIVIA_URL").unwrap_or_else(|| DEFAULT_TRIVIA_URL.into());
        let mut premium = env_flag(env, "QUIZ_PREMIUM");

        let mut settings = QuizSettings::standard();
        if let Some(secs) = env_number(env, "QUIZ_QUESTION_SECS")? {
            settings = settings.with_question_secs(secs)?;
        }
        if let Some(ms) = env_number(env, "QUIZ_REVEAL_MS")? {
            settings = settings.with_reveal_delay_ms(ms)?;
        }

        let mut command_name: Option<String> = None;
        let mut positional: Vec<String> = Vec::new();
        let mut created: Option<QuizId> = None;
        let mut title = String::new();
        let mut questions = Vec::new();
        let mut schedule_at: Option<DateTime<Utc>> = None;

        let mut args = argv.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--remote" => remote = true,
                "--trivia-url" => {
                    trivia_url = require_value(&mut args, "--trivia-url")?;
                    remote = true;
                }
                "--premium" => premium = true,
                "--created" => {
                    let raw = require_value(&mut args, "--created")?;
                    let id = raw
                        .parse::<QuizId>()
                        .map_err(|_| ArgsError::InvalidQuizId { raw: raw.clone() })?;
                    created = Some(id);
                }
                "--title" => title = require_value(&mut args, "--title")?,
                "--question" => {
                    let raw = require_value(&mut args, "--question")?;
                    questions.push(parse_question(&raw)?);
                }
                "--at" => {
                    let raw = require_value(&mut args, "--at")?;
                    let at = DateTime::parse_from_rfc3339(raw.trim())
                        .map_err(|_| ArgsError::InvalidSchedule { raw: raw.clone() })?;
                    schedule_at = Some(at.with_timezone(&Utc));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ if command_name.is_none() => command_name = Some(arg),
                _ => positional.push(arg),
            }
        }

        let command = match command_name.as_deref().unwrap_or("play") {
            "play" => Command::Play { created },
            "login" => {
                let name = positional.join(" ");
                if name.trim().is_empty() {
                    return Err(ArgsError::MissingName);
                }
                Command::Login { name }
            }
            "logout" => Command::Logout,
            "stats" => Command::Stats,
            "achievements" => Command::Achievements,
            "leaderboard" => Command::Leaderboard,
            "history" => Command::History,
            "create" => Command::Create {
                draft: CreatedQuizDraft {
                    title,
                    questions,
                    schedule_at,
                },
            },
            "scheduled" => Command::Scheduled,
            other => return Err(ArgsError::UnknownCommand(other.to_owned())),
        };

        let source = if remote {
            SourceConfig::Remote {
                base_url: trivia_url,
            }
        } else {
            SourceConfig::Bank
        };

        Ok(Self {
            command,
            db_url,
            source,
            settings: settings.with_premium(premium),
        })
    }
}

/// `"prompt|correct|wrong, wrong"` as typed on the command line.
fn parse_question(raw: &str) -> Result<CreatedQuestionInput, ArgsError> {
    let mut parts = raw.splitn(3, '|');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(prompt), Some(correct), Some(incorrect)) => {
            Ok(CreatedQuestionInput::new(prompt, correct, incorrect))
        }
        _ => Err(ArgsError::InvalidQuestion {
            raw: raw.to_owned(),
        }),
    }
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], vars: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let lookup = move |name: &str| vars.get(name).cloned();
        Args::parse(args.iter().map(|s| (*s).to_owned()).collect(), &lookup)
    }

    #[test]
    fn defaults_to_play_with_bank() {
        let args = parse(&[], &[]).unwrap();
        assert_eq!(args.command, Command::Play { created: None });
        assert_eq!(args.source, SourceConfig::Bank);
        assert!(args.db_url.starts_with("sqlite://"));
        assert_eq!(args.settings, QuizSettings::standard());
    }

    #[test]
    fn flags_override_environment() {
        let args = parse(
            &["--db", "sqlite::memory:", "--trivia-url", "http://localhost:9000", "stats"],
            &[("QUIZ_DB_URL", "sqlite://elsewhere.db"), ("QUIZ_PREMIUM", "true")],
        )
        .unwrap();
        assert_eq!(args.command, Command::Stats);
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(
            args.source,
            SourceConfig::Remote {
                base_url: "http://localhost:9000".into()
            }
        );
        assert!(args.settings.premium());
    }

    #[test]
    fn timing_comes_from_environment() {
        let args = parse(&[], &[("QUIZ_QUESTION_SECS", "10"), ("QUIZ_REVEAL_MS", "0")]).unwrap();
        assert_eq!(args.settings.question_secs(), 10);
        assert!(args.settings.reveal_delay().is_zero());

        assert!(matches!(
            parse(&[], &[("QUIZ_QUESTION_SECS", "2")]),
            Err(ArgsError::Settings(_))
        ));
        assert!(matches!(
            parse(&[], &[("QUIZ_REVEAL_MS", "soon")]),
            Err(ArgsError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn parses_create_command() {
        let args = parse(
            &[
                "create",
                "--title",
                "Space",
                "--question",
                "Closest star?|The Sun|Sirius, Vega",
                "--at",
                "2030-01-01T10:00:00Z",
            ],
            &[],
        )
        .unwrap();
        let Command::Create { draft } = args.command else {
            panic!("expected create");
        };
        assert_eq!(draft.title, "Space");
        assert_eq!(draft.questions[0].correct_answer, "The Sun");
        assert!(draft.schedule_at.is_some());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(parse(&["dance"], &[]), Err(ArgsError::UnknownCommand(_))));
        assert!(matches!(parse(&["login"], &[]), Err(ArgsError::MissingName)));
        assert!(matches!(parse(&["--db"], &[]), Err(ArgsError::MissingValue { .. })));
        assert!(matches!(
            parse(&["create", "--question", "no separators"], &[]),
            Err(ArgsError::InvalidQuestion { .. })
        ));
        assert!(matches!(
            parse(&["play", "--created", "42"], &[]),
            Err(ArgsError::InvalidQuizId { .. })
        ));
    }

    #[test]
    fn login_joins_name_words() {
        let args = parse(&["login", "Ada", "Lovelace"], &[]).unwrap();
        assert_eq!(
            args.command,
            Command::Login {
                name: "Ada Lovelace".into()
            }
        );
    }
}
