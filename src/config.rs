//! Layered runtime settings.
//!
//! Settings come from built-in defaults, an optional TOML file, and
//! `MACHWATCH__*` environment variables, in increasing precedence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::transport::BackoffPolicy;

/// Top-level service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Broker connection settings.
    pub broker: BrokerSettings,
    /// Durable history settings.
    pub history: HistorySettings,
    /// In-memory ring buffer settings.
    pub ring: RingSettings,
    /// Reconnection backoff settings.
    pub backoff: BackoffSettings,
}

/// Where the telemetry comes from.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerSettings {
    /// Broker URL, e.g. "nats://localhost:4222".
    pub url: String,
    /// Subject the device publishes telemetry on.
    pub subject: String,
    /// Optional credentials file for authenticated brokers.
    pub credentials_file: Option<String>,
}

/// Durable history sink settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HistorySettings {
    /// Path of the SQLite history database.
    pub db_path: PathBuf,
}

/// Ring buffer settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RingSettings {
    /// Snapshots retained in memory.
    pub capacity: usize,
}

/// Reconnection backoff, as configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackoffSettings {
    /// "fixed" or "exponential".
    pub strategy: String,
    /// Delay of the first retry, in seconds.
    pub initial_secs: u64,
    /// Upper bound for the exponential strategy, in seconds.
    pub cap_secs: u64,
}

impl BackoffSettings {
    /// Translate into the transport layer's policy value.
    pub fn policy(&self) -> BackoffPolicy {
        let base = Duration::from_secs(self.initial_secs.max(1));
        match self.strategy.as_str() {
            "exponential" => BackoffPolicy::Exponential {
                base,
                cap: Duration::from_secs(self.cap_secs.max(self.initial_secs)),
            },
            _ => BackoffPolicy::Fixed(base),
        }
    }
}

impl Settings {
    /// Load settings from the optional file plus environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("broker.url", "nats://localhost:4222")?
            .set_default("broker.subject", "diagnostic_machine")?
            .set_default("history.db_path", "history.db")?
            .set_default("ring.capacity", 100i64)?
            .set_default("backoff.strategy", "fixed")?
            .set_default("backoff.initial_secs", 5i64)?
            .set_default("backoff.cap_secs", 60i64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(Environment::with_prefix("MACHWATCH").separator("__"))
            .build()?
            .try_deserialize()
    }
}
