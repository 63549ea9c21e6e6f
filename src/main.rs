//! report-sync CLI
//!
//! Mirrors the configured bucket prefix into a local directory once and exits.
//! Progress goes to stdout; logs go to stderr.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use report_sync::{Config, Event, ReportSync};

/// Download and decompress report objects from object storage
#[derive(Debug, Parser)]
#[command(name = "report-sync", version, about)]
struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Object Storage REST endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Object storage namespace
    #[arg(long)]
    namespace: Option<String>,

    /// Bucket to mirror
    #[arg(short, long, env = "REPORT_SYNC_BUCKET")]
    bucket: Option<String>,

    /// Object name prefix to list
    #[arg(short, long)]
    prefix: Option<String>,

    /// Destination directory
    #[arg(short, long)]
    dest: Option<PathBuf>,

    /// Maximum concurrent downloads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Objects per listing page
    #[arg(long)]
    page_size: Option<u32>,

    /// Bearer token for the object storage API
    #[arg(long, env = "REPORT_SYNC_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Log filter (e.g. "debug", "report_sync=trace"); defaults to RUST_LOG or "info"
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Build the effective configuration: file (or defaults), then flags
    fn config(&self) -> report_sync::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::read_file(path)?,
            None => Config::default(),
        };

        if let Some(endpoint) = &self.endpoint {
            config.store.endpoint = endpoint.clone();
        }
        if let Some(namespace) = &self.namespace {
            config.store.namespace = namespace.clone();
        }
        if let Some(bucket) = &self.bucket {
            config.store.bucket = bucket.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.store.prefix = prefix.clone();
        }
        if let Some(page_size) = self.page_size {
            config.store.page_size = Some(page_size);
        }
        if let Some(token) = &self.auth_token {
            config.store.auth_token = Some(token.clone());
        }
        if let Some(dest) = &self.dest {
            config.download.destination_dir = dest.clone();
        }
        if let Some(workers) = self.workers {
            config.download.max_concurrent_downloads = workers;
        }

        Ok(config)
    }
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Print per-object progress until the run finishes or the channel closes
async fn print_progress(mut events: tokio::sync::broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(Event::Saved { name, total_saved }) => {
                println!("----> File {name} Decompressed and Saved {total_saved}");
            }
            Ok(Event::Failed { name, error }) => {
                println!("Error downloading/decompressing {name}: {error}");
            }
            Ok(Event::Finished { .. }) | Err(RecvError::Closed) => break,
            Ok(_) => {}
            Err(RecvError::Lagged(missed)) => {
                tracing::debug!(missed, "progress printer fell behind");
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let sync = match cli.config().and_then(ReportSync::new) {
        Ok(sync) => sync,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let printer = tokio::spawn(print_progress(sync.subscribe()));
    let result = sync.run().await;
    // The run's final event has been sent; let the printer flush before the summary
    drop(sync);
    if let Err(e) = printer.await {
        tracing::debug!(error = %e, "progress printer stopped early");
    }

    match result {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "report sync aborted");
            ExitCode::FAILURE
        }
    }
}
