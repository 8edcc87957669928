use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use machwatch::config::Settings;
use machwatch::{
    Backoff, ConnectionManager, HistoryRing, MonitorHandle, NatsTransport, Pipeline, SqliteSink,
    StateStore, ThresholdClassifier,
};

#[derive(Parser, Debug)]
#[command(name = "machwatch")]
#[command(about = "Machine fault monitor: subscribes to device telemetry and tracks live state")]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Broker URL override (e.g. "nats://localhost:4222")
    #[arg(long)]
    url: Option<String>,

    /// Telemetry subject override
    #[arg(long)]
    subject: Option<String>,

    /// History database path override
    #[arg(long)]
    history_db: Option<PathBuf>,

    /// Ring buffer capacity override
    #[arg(long)]
    ring_capacity: Option<usize>,

    /// Seconds between status log lines
    #[arg(long, default_value = "10")]
    status_interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Misconfiguration is the one condition allowed to prevent startup;
    // everything past this point recovers on its own.
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        settings.broker.url = url;
    }
    if let Some(subject) = args.subject {
        settings.broker.subject = subject;
    }
    if let Some(path) = args.history_db {
        settings.history.db_path = path;
    }
    if let Some(capacity) = args.ring_capacity {
        settings.ring.capacity = capacity;
    }

    let sink = Arc::new(SqliteSink::open(&settings.history.db_path)?);
    let state = Arc::new(StateStore::new());
    let ring = Arc::new(HistoryRing::new(settings.ring.capacity));
    let pipeline = Arc::new(Pipeline::new(
        state.clone(),
        ring.clone(),
        Arc::new(ThresholdClassifier::default()),
        sink,
    ));
    let handle = MonitorHandle::new(state.clone(), ring);

    let mut builder = NatsTransport::builder().url(&settings.broker.url);
    if let Some(creds) = &settings.broker.credentials_file {
        builder = builder.credentials_file(creds);
    }
    let transport = builder.build();

    let manager = ConnectionManager::new(
        transport,
        settings.broker.subject.clone(),
        pipeline.clone(),
        state,
        Backoff::new(settings.backoff.policy()),
    );

    info!(
        "Connecting to {} (subject '{}', history {})",
        settings.broker.url,
        settings.broker.subject,
        settings.history.db_path.display()
    );
    let ingest = tokio::spawn(manager.run());

    let mut ticker = tokio::time::interval(Duration::from_secs(args.status_interval.max(1)));
    ticker.tick().await; // first tick fires immediately
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let current = handle.read_current();
                info!(
                    "status={} accepted={} rejected={} fault={} p={:.2} model={} fault_rate(10)={}",
                    current.connection_status,
                    pipeline.accepted(),
                    pipeline.rejected(),
                    current.verdict.is_fault,
                    current.verdict.fault_probability,
                    current.verdict.model_status,
                    handle
                        .fault_rate(10)
                        .map(|r| format!("{:.2}", r))
                        .unwrap_or_else(|| "n/a".to_string()),
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    // Best-effort teardown: aborting the ingest task tears the broker
    // connection down with it. An in-flight message may be lost, which is
    // acceptable because persistence is already best-effort.
    ingest.abort();
    Ok(())
}
