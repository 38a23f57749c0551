// Job Rejection Alarm entry point
// Watches the displayed message and screams once per rejection

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use rejection_alarm_core::actors::traits::{AlertEffect, CountStore, NotifyEffect};
use rejection_alarm_core::actors::WatcherHandle;
use rejection_alarm_core::config::AlarmConfig;
use rejection_alarm_core::database::{CounterBackend, SqliteCountStore};
use rejection_alarm_core::effects::{ConsoleToast, LogAlert, LogNotifier, SoundAlert};
use rejection_alarm_core::logging::init_tracing;
use rejection_alarm_core::source::{PageFileSource, PagePoller};

#[derive(Debug, Parser)]
#[command(name = "rejection-alarm", version, about = "Screams when a job rejection email shows up")]
struct Cli {
    /// Log alerts and notifications instead of using the terminal
    #[arg(long, global = true)]
    log_only: bool,

    /// Read settings from this env file instead of `.env`
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Watch the page file and alert on rejections (default)
    Watch,
    /// Print the persisted rejection count
    Count,
    /// Reset the persisted rejection count to 0
    Reset,
    /// Play the alert once
    TestAlert,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, env_file) = match &cli.env_file {
        Some(path) => AlarmConfig::load_from(path).map(|config| (config, Some(path.clone()))),
        None => AlarmConfig::load(),
    }
    .context("Invalid configuration")?;
    init_tracing(config.log_format)?;
    if let Some(path) = env_file {
        info!("Loaded environment from {:?}", path);
    }

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch if cli.log_only => watch(&config, LogAlert, LogNotifier).await,
        Command::Watch => {
            let alert = SoundAlert::prepare(&config.data_dir);
            watch(&config, alert, ConsoleToast).await
        }
        Command::Count => {
            let count = open_counter(&config).await?.load_count().await?;
            println!("{}", count);
            Ok(())
        }
        Command::Reset => {
            open_counter(&config).await?.persist_count(0).await?;
            println!("0");
            Ok(())
        }
        Command::TestAlert if cli.log_only => Ok(LogAlert.play()?),
        Command::TestAlert => Ok(SoundAlert::prepare(&config.data_dir).play()?),
    }
}

/// The persisted counter; one-shot commands fail instead of using memory.
async fn open_counter(config: &AlarmConfig) -> anyhow::Result<SqliteCountStore> {
    SqliteCountStore::open_in(&config.data_dir)
        .await
        .with_context(|| format!("Cannot open rejection counter in {:?}", config.data_dir))
}

async fn watch<A, N>(config: &AlarmConfig, alert: A, notifier: N) -> anyhow::Result<()>
where
    A: AlertEffect,
    N: NotifyEffect,
{
    let store = Arc::new(CounterBackend::open_in_or_memory(&config.data_dir).await);
    let source = Arc::new(PageFileSource::with_min_body_chars(
        &config.snapshot_path,
        config.min_body_chars,
    ));

    let handle = WatcherHandle::spawn(
        source.clone(),
        Arc::new(alert),
        Arc::new(notifier),
        store,
        config.timings(),
    );

    let poller = PagePoller::new(source, handle.clone(), config.navigation_poll());
    let poll_task = tokio::spawn(async move {
        if let Err(e) = poller.run().await {
            warn!("Page poller stopped: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    poll_task.abort();
    handle.shutdown().await?;
    Ok(())
}
