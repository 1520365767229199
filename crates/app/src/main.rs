use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use services::{
    AppServices, Clock, IdentityProvider, Notification, Notifier, NotifyError, StaticIdentity,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod play;

use cli::{ArgsError, Command, Config, ReminderAction};

/// Prints notifications inline with the game output.
struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        println!("* {}: {}", notification.title, notification.body);
        Ok(())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = cli::parse(std::env::args().skip(1), |key| std::env::var(key).ok()).map_err(
        |e| {
            eprintln!("{e}");
            cli::print_usage();
            e
        },
    )?;
    if config.command == Command::Help {
        cli::print_usage();
        return Ok(());
    }

    let services = build_services(&config).await?;

    match config.command {
        Command::Play(request) => play::play_quiz(&services, &request).await,
        Command::Memory => play::play_memory(&services).await,
        Command::History { limit, json } => history(&services, limit, json).await,
        Command::Reminder(action) => reminder(&services, action).await,
        Command::Help => Ok(()),
    }
}

async fn build_services(config: &Config) -> Result<AppServices, Box<dyn std::error::Error>> {
    let clock = Clock::system();
    let identity: Arc<dyn IdentityProvider> = Arc::new(
        config
            .identity
            .clone()
            .map_or_else(StaticIdentity::anonymous, StaticIdentity::signed_in),
    );
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

    // Every pooled connection to `sqlite::memory:` would open its own empty
    // database, so the in-memory URL maps to the in-process repository.
    if config.db_url == "sqlite::memory:" {
        tracing::info!("using in-memory storage; results are discarded on exit");
        return Ok(AppServices::in_memory(clock, identity, notifier));
    }

    prepare_sqlite_file(&config.db_url)?;
    tracing::debug!(db_url = %config.db_url, "opening result store");
    Ok(AppServices::new_sqlite(&config.db_url, clock, identity, notifier).await?)
}

async fn history(
    services: &AppServices,
    limit: u32,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = services.progress();
    let stats = progress.stats().await?;
    let mut rows = progress.recent_results().await?;
    rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

    if json {
        let body = serde_json::json!({ "stats": stats, "results": rows });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!(
        "Games {}  best {}%  average {}%  perfect {}  streak {} day(s)",
        stats.games_played,
        stats.best_percentage,
        stats.average_percentage,
        stats.perfect_scores,
        stats.day_streak
    );
    for row in &rows {
        let record = &row.record;
        println!(
            "{}  {:<14} {:>3}/{:<3} {:>3}%  {}",
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.game_type.as_str(),
            record.score,
            record.total_questions,
            record.percentage,
            record.ended_by.message()
        );
    }
    Ok(())
}

async fn reminder(
    services: &AppServices,
    action: ReminderAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let reminders = services.reminders();
    let schedule = match action {
        ReminderAction::Show => reminders.schedule().await?,
        ReminderAction::Enable => reminders.set_enabled(true).await?,
        ReminderAction::Disable => reminders.set_enabled(false).await?,
        ReminderAction::Time(raw) => reminders.set_time(&raw).await?,
        ReminderAction::Toggle(day) => reminders.toggle_day(day).await?,
        ReminderAction::Check { since } => {
            let since = since.unwrap_or_else(|| Clock::system().now() - Duration::days(1));
            match reminders.fire_if_due(since).await? {
                Some(due) => tracing::debug!(%due, "reminder was due"),
                None => println!("No reminder due since {}.", since.format("%Y-%m-%d %H:%M")),
            }
            return Ok(());
        }
    };

    let days: Vec<String> = schedule.days().iter().map(|d| d.to_string()).collect();
    println!(
        "Reminder {} at {} UTC on {}",
        if schedule.enabled() { "on" } else { "off" },
        schedule.time_label(),
        if days.is_empty() { "no days".to_owned() } else { days.join(", ") }
    );
    if let Some(next) = reminders.next_fire().await? {
        println!("Next reminder: {}", next.format("%a %Y-%m-%d %H:%M"));
    }
    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
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
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
