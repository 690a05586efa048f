use anyhow::{Context, Result};
use book_courier_core::caption::DecorativeCaption;
use book_courier_core::cycle::ScanCycle;
use book_courier_core::identity::{identity, publisher_label};
use book_courier_core::store::FileStore;
use book_courier_core::supervisor::{StopHandle, Supervisor};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::PathBuf;

use crate::load_config::{load_config, AppConfig};
use crate::telegram::TelegramChannel;

/// CLI for book-courier: publish every book dropped in a folder to a Telegram channel, once.
#[derive(Parser)]
#[clap(
    name = "book-courier",
    version,
    about = "Watch a folder of books and publish each one once to a Telegram channel"
)]
pub struct Cli {
    /// Also append log output to this file
    #[clap(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the inbox forever, publishing new books, until interrupted
    Watch {
        /// Path to an optional YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Run a single scan cycle and print its report as JSON
    Once {
        /// Path to an optional YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Print the book identity and publisher label derived from each filename
    Identity {
        /// Filenames to inspect
        #[clap(required = true)]
        filenames: Vec<String>,
    },
}

/// Async CLI entrypoint, shared by main() and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Watch { config } => {
            let config = load_config(config.as_deref())?;
            watch(&config).await
        }
        Commands::Once { config } => {
            let config = load_config(config.as_deref())?;
            once(&config).await
        }
        Commands::Identity { filenames } => {
            for filename in filenames {
                println!(
                    "{filename}\t{}\t{}",
                    identity(&filename),
                    publisher_label(&filename)
                );
            }
            Ok(())
        }
    }
}

fn build_cycle(config: &AppConfig) -> Result<ScanCycle<TelegramChannel, DecorativeCaption>> {
    FileStore::new(&config.courier.inbox_dir, &config.courier.archive_dir)
        .ensure_dirs()
        .context("Failed to create inbox/archive directories")?;
    let channel = TelegramChannel::new(config.telegram.clone())
        .context("Failed to build Telegram HTTP client")?;
    Ok(ScanCycle::new(&config.courier, channel, DecorativeCaption))
}

async fn watch(config: &AppConfig) -> Result<()> {
    let supervisor = Supervisor::new(&config.courier, build_cycle(config)?);

    let stop = supervisor.stop_handle();
    tokio::spawn(async move {
        if handle_interrupts(stop, tokio::signal::ctrl_c).await == Interrupt::Forced {
            std::process::exit(FORCED_EXIT_CODE);
        }
    });

    tracing::info!("Bot started in watch mode");
    let stats = supervisor.run().await;
    println!(
        "Stopped after {} cycles ({} failed), {} books published.",
        stats.cycles, stats.failures, stats.published
    );
    Ok(())
}

/// Exit status when a second interrupt forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

/// How [`handle_interrupts`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// A second interrupt arrived while the supervisor was still draining.
    Forced,
    /// The signal listener itself failed.
    ListenerFailed,
}

/// First interrupt: request a cooperative stop. Second interrupt: report
/// [`Interrupt::Forced`] so the caller can exit without waiting for the cycle.
pub async fn handle_interrupts<F, Fut>(stop: StopHandle, mut next_interrupt: F) -> Interrupt
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = next_interrupt().await {
        tracing::error!(error = %e, "Failed to listen for interrupt signal");
        return Interrupt::ListenerFailed;
    }
    tracing::info!("Interrupt received, stopping after the current cycle (interrupt again to force exit)");
    stop.stop();

    match next_interrupt().await {
        Ok(()) => {
            tracing::warn!("Second interrupt received, forcing exit");
            Interrupt::Forced
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for interrupt signal");
            Interrupt::ListenerFailed
        }
    }
}

async fn once(config: &AppConfig) -> Result<()> {
    let cycle = build_cycle(config)?;
    let report = cycle.run_cycle().await.context("Scan cycle failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
