// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use certsync::certs::CertbotIssuer;
use certsync::config::Settings;
use certsync::constants::{DEFAULT_DB_PATH, DEFAULT_PASS_INTERVAL_SECS};
use certsync::metrics;
use certsync::reconciler::Reconciler;
use certsync::resolver::SystemResolver;
use certsync::store::SqliteStore;
use chrono::Utc;
use clap::Parser;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Domain ownership and TLS certificate reconciliation daemon.
#[derive(Parser, Debug)]
#[command(name = "certsync", version, about)]
struct Args {
    /// Path to the SQLite domain database
    #[arg(long, env = "CERTSYNC_DB", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Seconds between reconciliation passes
    #[arg(long, env = "CERTSYNC_INTERVAL", default_value_t = DEFAULT_PASS_INTERVAL_SECS)]
    interval: u64,

    /// Run a single pass and exit (for external schedulers such as cron)
    #[arg(long)]
    once: bool,

    /// Address to serve Prometheus metrics on (disabled when unset)
    #[arg(long, env = "CERTSYNC_METRICS_ADDR")]
    metrics_addr: Option<SocketAddr>,
}

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("certsync-worker")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Initialize logging with custom format
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug certsync
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json certsync
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let args = Args::parse();

    info!("Starting certsync");

    // Fail fast on missing or malformed configuration.
    let settings = Settings::from_env()?;
    debug!(master_ip = %settings.master_ip, "Configuration loaded");

    let store = SqliteStore::new(&args.db).await?;
    debug!(db = %args.db.display(), "Domain store opened");

    let reconciler = Reconciler::new(
        settings.master_ip,
        Arc::new(SystemResolver::new()),
        Arc::new(CertbotIssuer::new(&settings)),
    );

    if let Some(addr) = args.metrics_addr {
        info!(%addr, "Serving metrics");
        tokio::spawn(async move {
            if let Err(e) = metrics::serve(addr).await {
                error!("Metrics server exited: {e:?}");
            }
        });
    }

    if args.once {
        let summary = reconciler.run_pass(&store, Utc::now()).await?;
        info!(checked = summary.checked, "Single pass complete");
        return Ok(());
    }

    info!(interval_secs = args.interval, "Entering reconciliation loop");

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // A failed pass leaves the database untouched; the next tick
                // simply retries the same due set.
                if let Err(e) = reconciler.run_pass(&store, Utc::now()).await {
                    error!("Reconciliation pass failed: {e}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, exiting");
                break;
            }
        }
    }

    Ok(())
}
