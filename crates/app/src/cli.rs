use std::fmt;

use brain_core::model::{OperandRange, Operation, UserId};
use chrono::{DateTime, Utc, Weekday};
use services::{Identity, QuizRequest};

pub const DEFAULT_DB_URL: &str = "sqlite://brain.sqlite3";
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidOperation { raw: String },
    InvalidRange { min: u32, max: u32 },
    InvalidDay { raw: String },
    InvalidTimestamp { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidOperation { raw } => write!(f, "invalid --operation value: {raw}"),
            ArgsError::InvalidRange { min, max } => {
                write!(f, "--min {min} must not exceed --max {max}")
            }
            ArgsError::InvalidDay { raw } => write!(f, "invalid weekday: {raw}"),
            ArgsError::InvalidTimestamp { raw } => write!(f, "invalid --since value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderAction {
    Show,
    Enable,
    Disable,
    Time(String),
    Toggle(Weekday),
    Check { since: Option<DateTime<Utc>> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play(QuizRequest),
    Memory,
    History { limit: u32, json: bool },
    Reminder(ReminderAction),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub identity: Option<Identity>,
    pub command: Command,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  brain [play] [--count <n>] [--operation <op>] [--min <n>] [--max <n>] [--time <secs>]");
    eprintln!("  brain memory");
    eprintln!("  brain history [--limit <n>] [--json]");
    eprintln!("  brain reminder [show | on | off | time <HH:MM> | toggle <day> | check [--since <rfc3339>]]");
    eprintln!();
    eprintln!("Every command accepts --db <sqlite_url> (default {DEFAULT_DB_URL}).");
    eprintln!("Operations: addition, subtraction, multiplication, division, mixed");
    eprintln!("While playing: 1-4 answers, p pauses, r resumes, q quits.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  BRAIN_DB_URL, BRAIN_USER_ID, BRAIN_USER_EMAIL, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

/// Parse arguments (without the program name), reading fallbacks through `env`.
pub fn parse(
    args: impl IntoIterator<Item = String>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config, ArgsError> {
    let mut args = args.into_iter().peekable();

    let command_name = match args.peek().map(String::as_str) {
        None => "play".to_owned(),
        Some(first) if first.starts_with('-') => "play".to_owned(),
        Some(_) => args.next().unwrap_or_default(),
    };

    let mut db_url = env("BRAIN_DB_URL")
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| DEFAULT_DB_URL.to_owned(), normalize_sqlite_url);

    let mut request = QuizRequest::default();
    let mut min = request.range.min();
    let mut max = request.range.max();
    let mut limit = DEFAULT_HISTORY_LIMIT;
    let mut json = false;
    let mut since = None;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = require_value(&mut args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                db_url = normalize_sqlite_url(value);
            }
            "--help" | "-h" => {
                return Ok(Config {
                    db_url,
                    identity: None,
                    command: Command::Help,
                });
            }
            "--count" if command_name == "play" => {
                request.count = parse_number(&mut args, "--count")?;
            }
            "--operation" if command_name == "play" => {
                let raw = require_value(&mut args, "--operation")?;
                request.operation = raw
                    .parse::<Operation>()
                    .map_err(|_| ArgsError::InvalidOperation { raw })?;
            }
            "--min" if command_name == "play" => min = parse_number(&mut args, "--min")?,
            "--max" if command_name == "play" => max = parse_number(&mut args, "--max")?,
            "--time" if command_name == "play" => {
                request.time_budget_secs = parse_number(&mut args, "--time")?;
            }
            "--limit" if command_name == "history" => {
                limit = parse_number(&mut args, "--limit")?;
            }
            "--json" if command_name == "history" => json = true,
            "--since" if command_name == "reminder" => {
                let raw = require_value(&mut args, "--since")?;
                let parsed = raw
                    .parse::<DateTime<Utc>>()
                    .map_err(|_| ArgsError::InvalidTimestamp { raw })?;
                since = Some(parsed);
            }
            _ if command_name == "reminder" && !arg.starts_with('-') => {
                positional.push(arg);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    let command = match command_name.as_str() {
        "play" => {
            request.range =
                OperandRange::new(min, max).map_err(|_| ArgsError::InvalidRange { min, max })?;
            Command::Play(request)
        }
        "memory" => Command::Memory,
        "history" => Command::History { limit, json },
        "reminder" => Command::Reminder(parse_reminder(positional, since)?),
        "help" => Command::Help,
        other => return Err(ArgsError::UnknownCommand(other.to_owned())),
    };

    let identity = env("BRAIN_USER_ID")
        .filter(|v| !v.trim().is_empty())
        .map(|id| Identity::new(UserId::new(id.trim()), env("BRAIN_USER_EMAIL")));

    Ok(Config {
        db_url,
        identity,
        command,
    })
}

fn parse_reminder(
    positional: Vec<String>,
    since: Option<DateTime<Utc>>,
) -> Result<ReminderAction, ArgsError> {
    let mut words = positional.into_iter();
    let action = match words.next().as_deref() {
        None | Some("show") => ReminderAction::Show,
        Some("on") => ReminderAction::Enable,
        Some("off") => ReminderAction::Disable,
        Some("time") => ReminderAction::Time(
            words
                .next()
                .ok_or(ArgsError::MissingValue { flag: "time" })?,
        ),
        Some("toggle") => {
            let raw = words
                .next()
                .ok_or(ArgsError::MissingValue { flag: "toggle" })?;
            let day = raw
                .parse::<Weekday>()
                .map_err(|_| ArgsError::InvalidDay { raw })?;
            ReminderAction::Toggle(day)
        }
        Some("check") => ReminderAction::Check { since },
        Some(other) => return Err(ArgsError::UnknownArg(other.to_owned())),
    };
    if let Some(extra) = words.next() {
        return Err(ArgsError::UnknownArg(extra));
    }
    Ok(action)
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
