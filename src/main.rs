mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use bili2vrc::app::{App, open_storage};
use bili2vrc::clipboard::SystemClipboard;
use bili2vrc::clock::SystemClock;
use bili2vrc::config::Config;
use bili2vrc::ledger::HistoryItem;
use bili2vrc::notify::{ConsoleNotifier, Notification};
use bili2vrc::observability::init_tracing;
use bili2vrc::parsing::{TriggerSource, TriggerStatus, trigger_parse, trigger_reparse};
use chrono::{Local, TimeZone};
use clap::Parser;
use cli::{Cli, Commands, HistoryCommand, OptionsCommand};
use tracing::{info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<ExitCode, BoxError> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    init_tracing(&config.telemetry.log_filter);

    let storage = open_storage(&config, cli.ephemeral)?;
    let app = App::new(
        config,
        storage,
        Arc::new(SystemClipboard),
        Arc::new(ConsoleNotifier),
        Arc::new(SystemClock),
    )?;

    let status = match cli.command {
        Commands::Parse(args) => {
            tokio::select! {
                (status, outcome) = trigger_parse(&app.parser, TriggerSource::CommandLine, &args.url) => {
                    if let Some(url) = outcome.media_url() {
                        println!("{url}");
                    }
                    status
                }
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, abandoning parse");
                    app.state.release_held(app.clock.now_ms()).await?;
                    TriggerStatus::Failed
                }
            }
        }
        Commands::History(command) => run_history(&app, command).await?,
        Commands::Options(command) => run_options(&app, command).await?,
        Commands::Startup => {
            let report = app.lifecycle.on_startup(env!("CARGO_PKG_VERSION")).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            TriggerStatus::Successful
        }
    };

    info!(metrics = ?app.metrics.snapshot(), "Done");

    Ok(match status {
        TriggerStatus::Successful => ExitCode::SUCCESS,
        TriggerStatus::Failed => ExitCode::FAILURE,
    })
}

async fn run_history(app: &App, command: HistoryCommand) -> Result<TriggerStatus, BoxError> {
    match command {
        HistoryCommand::List { grouped: false } => {
            for item in app.ledger.sorted_by_recent_use().await? {
                print_item(&item);
            }
        }
        HistoryCommand::List { grouped: true } => {
            for group in app.ledger.grouped(app.clock.now_ms()).await? {
                println!("== {} ==", group.period.label());
                for item in &group.items {
                    print_item(item);
                }
            }
        }
        HistoryCommand::Delete { id } => {
            if !app.ledger.remove(id).await? {
                eprintln!("No history entry with id {id}");
                return Ok(TriggerStatus::Failed);
            }
            app.notifier.notify(&Notification::HistoryDeleted).await?;
        }
        HistoryCommand::Reparse { id } => {
            let (status, outcome) = trigger_reparse(&app.parser, id).await;
            if let Some(url) = outcome.media_url() {
                println!("{url}");
            }
            return Ok(status);
        }
        HistoryCommand::Purge => {
            let stats = app.lifecycle.purge_expired_history().await?;
            println!("Purged {} of {} entries", stats.purged, stats.examined);
        }
    }
    Ok(TriggerStatus::Successful)
}

async fn run_options(app: &App, command: OptionsCommand) -> Result<TriggerStatus, BoxError> {
    let options = match command {
        OptionsCommand::Show => app.options.load().await?,
        OptionsCommand::SetRetention { hours } => {
            app.options.set_history_retention_hours(hours).await?
        }
    };
    print!("{}", toml::to_string_pretty(&options)?);
    Ok(TriggerStatus::Successful)
}

fn print_item(item: &HistoryItem) {
    let parsed_at = Local
        .timestamp_millis_opt(item.last_parsing_timestamp)
        .single()
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "?".to_string());

    let title = match &item.subtitle {
        Some(subtitle) => format!("{} / {}", item.title, subtitle),
        None => item.title.clone(),
    };

    println!(
        "{}  {}  {} p{}  [{}]  {}",
        item.history_id,
        parsed_at,
        item.video_id,
        item.page_number,
        item.quality_text(),
        title
    );
    println!("    {}", item.parsed_media_url);
}
