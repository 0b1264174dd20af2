use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use ghbar::accounts::{AccountRegistry, CredentialStore};
use ghbar::app::actions::{RefreshReason, TriggerOutcome};
use ghbar::app::aggregator::Aggregator;
use ghbar::app::scheduler::{Scheduler, SchedulerConfig, SchedulerHandle};
use ghbar::app::state::RefreshEvent;
use ghbar::app::view;
use ghbar::github::{GithubClient, QueryClient};
use ghbar::util::config::AppConfig;
use ghbar::util::settings::{self, SettingKey, SettingValue};

#[derive(Parser, Debug)]
#[command(name = "ghbar", version, about = "Pull requests waiting on you, across GitHub accounts")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Refresh once, print the result and exit
    #[arg(long)]
    once: bool,

    /// Override the refresh interval in seconds (minimum 60)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Enable debug logging to file
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(secs) = cli.interval {
        config.refresh.interval_secs = secs;
    }

    let _guard = setup_logging(&config, cli.debug)?;

    info!("ghbar starting");

    let registry = Arc::new(AccountRegistry::from_config(&config.accounts));
    let client = GithubClient::new(&config.github)?;
    let account_timeout = match config.refresh.account_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let aggregator =
        Aggregator::new(Arc::new(QueryClient::new(client))).with_account_timeout(account_timeout);

    let handle = Scheduler::spawn(
        SchedulerConfig::from(&config.refresh),
        registry.clone(),
        aggregator,
    );
    let mut events = handle.subscribe();
    handle.trigger_refresh(RefreshReason::Manual);

    if cli.once {
        loop {
            match events.recv().await {
                Ok(RefreshEvent::Completed { .. } | RefreshEvent::AccountsRequired) => break,
                Ok(RefreshEvent::AccountFailed(_)) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        print!("{}", view::render(&handle.snapshot(), &config.display));
        handle.shutdown();
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(RefreshEvent::Completed { .. }) => {
                    print!("{}", view::render(&handle.snapshot(), &config.display));
                }
                // A cycle that queried accounts is rendered on Completed.
                Ok(RefreshEvent::AccountsRequired) => {
                    let snapshot = handle.snapshot();
                    if snapshot.failures.is_empty() {
                        print!("{}", view::render(&snapshot, &config.display));
                    }
                }
                Ok(RefreshEvent::AccountFailed(failure)) => {
                    warn!(account = %failure.label, error = %failure.error, "Account refresh failed");
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Missed refresh events"),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !handle_command(line.trim(), &mut config, &registry, &handle) {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    handle.shutdown();
    Ok(())
}

/// Returns false when the user asked to quit.
fn handle_command(
    line: &str,
    config: &mut AppConfig,
    registry: &AccountRegistry,
    handle: &SchedulerHandle,
) -> bool {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("q" | "quit"), _, _) => return false,
        (Some("r" | "refresh"), _, _) => {
            if handle.trigger_refresh(RefreshReason::Manual) == TriggerOutcome::Dropped {
                println!("Refresh already in progress");
            }
        }
        (Some("settings"), _, _) => {
            for (name, value) in settings::describe(config) {
                println!("{name} = {value}");
            }
        }
        (Some("set"), Some(name), Some(value)) => match settings::apply(config, name, value) {
            Ok(change) => {
                if change.key == SettingKey::RefreshInterval
                    && let SettingValue::Integer(secs) = change.value
                {
                    config.refresh.interval_secs = handle.set_refresh_interval_secs(secs).as_secs();
                }
                if change.affects_refresh_presentation {
                    print!("{}", view::render(&handle.snapshot(), &config.display));
                }
            }
            Err(e) => println!("{e}"),
        },
        (Some("accounts"), _, _) => {
            for account in registry.list_all_accounts() {
                let state = if account.enabled { "enabled" } else { "disabled" };
                println!("{} ({state})", account.label);
            }
        }
        (Some(cmd @ ("enable" | "disable")), Some(label), _) => {
            if registry.set_enabled(label, cmd == "enable") {
                handle.notify_accounts_changed();
            } else {
                println!("Cannot {cmd} account '{label}'");
            }
        }
        (None, _, _) => {}
        _ => println!("Commands: r, settings, set <name> <value>, accounts, enable|disable <label>, q"),
    }
    true
}

fn setup_logging(
    config: &AppConfig,
    debug: bool,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    if !debug {
        return Ok(None);
    }

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "ghbar.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter("ghbar=debug")
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}
