mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use droidscope_adb::{AdbClient, AdbLocator, TokioLauncher};
use droidscope_logs::{LogBuffer, LogEntry, LogStreamManager, SeverityCounts, StreamConfig};

use crate::config::{FileConfig, Settings};

/// Droidscope - stream, classify and retain Android device logs
#[derive(Parser, Debug)]
#[command(name = "droidscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ~/.droidscope/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to the adb executable (defaults to the bundled tools/adb)
    #[arg(long, global = true, value_name = "PATH")]
    adb: Option<PathBuf>,

    /// Device serial to capture from
    #[arg(long, short = 's', global = true)]
    serial: Option<String>,

    /// Number of log entries retained in memory
    #[arg(long, global = true)]
    buffer_size: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream device logs until interrupted (default)
    Stream {
        /// Stop automatically after this many seconds
        #[arg(long, value_name = "SECS")]
        duration: Option<u64>,

        /// Print entries as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// List attached devices
    Devices,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing; stdout is reserved for log output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let file = FileConfig::load(args.config.as_deref())?;
    let settings = Settings::resolve(file, args.adb, args.buffer_size, args.serial);

    let locator = match &settings.adb_path {
        Some(path) => AdbLocator::with_path(path),
        None => AdbLocator::bundled(),
    };
    let launcher = Arc::new(TokioLauncher::new(locator));

    match args.command.unwrap_or(Command::Stream {
        duration: None,
        json: false,
    }) {
        Command::Stream { duration, json } => {
            stream(launcher, &settings, duration.map(Duration::from_secs), json).await
        }
        Command::Devices => devices(launcher).await,
    }
}

async fn devices(launcher: Arc<TokioLauncher>) -> Result<()> {
    let client = AdbClient::new(launcher);
    let devices = client.devices().await.context("failed to list devices")?;

    if devices.is_empty() {
        eprintln!("No Android devices detected");
    }
    for device in &devices {
        println!("{}\t{}", device.serial, device.state);
    }

    let online = devices.iter().filter(|d| d.is_online()).count();
    if online < devices.len() {
        eprintln!(
            "{} of {} devices are not ready for logcat",
            devices.len() - online,
            devices.len()
        );
    }

    Ok(())
}

async fn stream(
    launcher: Arc<TokioLauncher>,
    settings: &Settings,
    duration: Option<Duration>,
    json: bool,
) -> Result<()> {
    let buffer = LogBuffer::new(settings.buffer_size).context("invalid buffer size")?;
    let stream_config = match &settings.serial {
        Some(serial) => StreamConfig::for_device(serial),
        None => StreamConfig::default(),
    };
    let manager = LogStreamManager::new(launcher, buffer, stream_config);

    // Entries are printed from this task; the sink only forwards them
    let (log_tx, mut log_rx) = mpsc::unbounded_channel::<LogEntry>();
    let sink = move |entry: LogEntry| {
        let _ = log_tx.send(entry);
    };

    let cancel = CancellationToken::new();
    manager
        .start(sink, cancel.clone())
        .await
        .context("failed to start log stream")?;
    eprintln!("Log streaming started");

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    let outcome = loop {
        tokio::select! {
            _ = &mut interrupted => break Ok(()),

            _ = &mut deadline => break Ok(()),

            entry = log_rx.recv() => match entry {
                Some(entry) => {
                    if let Err(e) = print_entry(&entry, json) {
                        break Err(e);
                    }
                }
                // The sink is dropped once the stream ends on its own
                None => {
                    eprintln!("Log stream ended");
                    break Ok(());
                }
            },
        }
    };

    manager.shutdown().await;
    eprintln!("Log streaming stopped");

    let snapshot = manager.buffer().snapshot();
    let counts = SeverityCounts::from_entries(&snapshot);
    eprintln!(
        "fatal: {}  exception: {}  error: {}  info: {}",
        counts.fatal, counts.exception, counts.error, counts.info
    );
    eprintln!(
        "Log buffer: {} / {}",
        manager.buffer().len(),
        manager.buffer().capacity()
    );

    outcome
}

fn print_entry(entry: &LogEntry, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(entry)?);
    } else {
        println!("{}", entry);
    }
    Ok(())
}
