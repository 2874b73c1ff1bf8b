use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hashwall_core::app::{IngestionPolicy, PullDriver, StreamDriver};
use hashwall_core::config::{DEFAULT_DATABASE, DEFAULT_MAX_RECORDS, WallConfig, load_env};
use hashwall_core::domain::{SearchQuery, SearchWindow};
use hashwall_core::impls::SqliteRecordStore;
use hashwall_core::ports::{Clock, RecordStore, SystemClock};
use hashwall_core::twitter::{Credentials, TwitterClient};

#[derive(Parser)]
#[command(name = "hashwall")]
#[command(about = "Collect images posted under a hashtag into a bounded store.")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "HASHWALL_DATABASE", default_value = DEFAULT_DATABASE, global = true)]
    database: PathBuf,

    /// Maximum number of stored images
    #[arg(long, env = "HASHWALL_MAX_RECORDS", default_value_t = DEFAULT_MAX_RECORDS, global = true)]
    max_records: usize,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search recent items once and ingest their images
    Pull {
        hashtag: String,

        /// Take at most N items instead of everything since yesterday
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Listen for new items until Ctrl+C
    Stream { hashtag: String },

    /// Print the most recent records as JSON lines
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    // RUST_LOG があればそちらを優先
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hashwall={level},hashwall_core={level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Flip `shutdown` once `signal` fires.
///
/// If the handler cannot be installed the sender is only dropped, so the
/// stream keeps running until the remote closes it.
async fn forward_shutdown<F>(signal: F, shutdown: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            warn!("Received Ctrl+C, shutting down...");
            let _ = shutdown.send(true);
        }
        Err(e) => error!(error = %e, "failed to listen for Ctrl+C"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env();
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // (A) 設定とストアを用意
    let config = WallConfig::new(cli.max_records, cli.database)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = SqliteRecordStore::open(&config.database, Arc::clone(&clock)).await?;
    info!(database = %config.database.display(), max_records = config.max_records, "store opened");

    match cli.command {
        Command::List { limit } => {
            for record in store.recent(limit).await? {
                println!("{}", serde_json::to_string(&record)?);
            }
        }

        Command::Pull { hashtag, limit } => {
            // (B) リモートとポリシーをつなぐ
            let source = TwitterClient::new(Credentials::from_env()?, Arc::clone(&clock))?;
            let policy = IngestionPolicy::from_config(store, &config)?;

            let window = match limit {
                Some(n) => SearchWindow::Limit(n),
                None => SearchWindow::since_yesterday(clock.as_ref()),
            };
            let summary = PullDriver::new(&policy)
                .run(&source, &SearchQuery::new(hashtag, window))
                .await?;
            println!("{summary}");
        }

        Command::Stream { hashtag } => {
            let source = TwitterClient::new(Credentials::from_env()?, Arc::clone(&clock))?;
            let policy = IngestionPolicy::from_config(store, &config)?;

            // (C) Ctrl+C で shutdown を立てる
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(forward_shutdown(tokio::signal::ctrl_c(), shutdown_tx));

            let summary = StreamDriver::new(&policy)
                .run(&source, &hashtag, shutdown_rx)
                .await?;
            println!("{summary}");
        }
    }

    Ok(())
}
