use anyhow::{Context, Result};
use clap::Parser;
use std::io::Stdout;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::util::SubscriberInitExt;

use skiff::config::Config;
use skiff::storage::{Database, DatabaseError};
use skiff::view::{JsonView, Message, Notifier};
use skiff::{command, logging, urls, NavError, Navigator};

/// Get the default config file path (~/.config/skiff/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("skiff")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "skiff",
    about = "Navigate a newsboat cache from a text editor over a JSON line protocol"
)]
struct Args {
    /// Config file (default: ~/.config/skiff/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// newsboat cache database, overrides db_path
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// newsboat urls file, overrides urls_path
    #[arg(long, value_name = "FILE")]
    urls: Option<PathBuf>,
}

type StdioNavigator = Navigator<JsonView<Stdout>>;

/// Run one protocol line. Only a broken stdout ends the session.
async fn handle_line(nav: &mut StdioNavigator, line: &str) -> Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    if verb == "complete" {
        let verbs = command::complete(rest.trim());
        nav.view_mut()
            .send(&Message::Completion { verbs })
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    match nav.command_line(line).await {
        Ok(()) => Ok(()),
        Err(NavError::View(e)) => Err(e).context("Failed to write to stdout"),
        Err(e) => {
            tracing::debug!(command = %line, error = %e, "Command failed");
            nav.view_mut()
                .send(&Message::Error {
                    message: e.to_string(),
                })
                .context("Failed to write to stdout")
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the protocol.
    let (subscriber, log_filter) = logging::subscriber(std::io::stderr);
    subscriber.init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    logging::apply_log_level(&log_filter, config.log_level.as_deref());

    config.apply_overrides(args.db, args.urls);
    config.validate().context("Invalid configuration")?;

    let db_path = config.db_path()?;
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::Locked) => {
            eprintln!(
                "Error: {} is locked by another process. Close it and try again.",
                db_path.display()
            );
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to open database"),
    };

    if let Some(urls_path) = &config.urls_path {
        let feeds = urls::load(urls_path)
            .with_context(|| format!("Failed to read tags from {}", urls_path.display()))?;
        db.sync_tags(&feeds).await.context("Failed to sync feed tags")?;
    }

    let (change_tx, mut change_rx) = mpsc::channel(config.notify_capacity);
    let mut nav = Navigator::new(db, JsonView::new(std::io::stdout()))
        .with_filters(config.filter_ids())
        .with_notifier(Notifier::new(change_tx));
    tracing::info!(db = %db_path.display(), "Ready for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read from stdin")? {
                    Some(line) => handle_line(&mut nav, &line).await?,
                    None => break,
                }
            }
            Some(change) = change_rx.recv() => {
                nav.view_mut()
                    .send(&Message::UnreadChanged(&change))
                    .context("Failed to write to stdout")?;
            }
        }
    }

    nav.shutdown().await;
    tracing::info!("stdin closed, exiting");
    Ok(())
}
