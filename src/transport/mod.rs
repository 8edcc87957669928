//! Transport abstraction over the pub/sub broker.
//!
//! The connection manager never names a concrete broker: it drives the
//! [`Transport`] and [`TransportConnection`] traits, implemented by
//! [`NatsTransport`] in production and by scripted fakes in tests.

mod manager;
mod nats;

pub use manager::{Backoff, BackoffPolicy, ConnectionManager};
pub use nats::{NatsTransport, NatsTransportBuilder};

use async_trait::async_trait;
use thiserror::Error;

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not reach the broker.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The broker rejected our credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Connected, but the subscription was refused.
    #[error("subscription failed: {0}")]
    Subscribe(String),
}

/// A pub/sub broker the connection manager can connect to.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish a new broker session.
    async fn connect(&self) -> Result<Box<dyn TransportConnection>, TransportError>;
}

/// One established broker session.
#[async_trait]
pub trait TransportConnection: Send {
    /// Subscribe to the telemetry subject.
    async fn subscribe(&mut self, subject: &str) -> Result<(), TransportError>;

    /// Wait for the next message body. `None` means the connection is gone
    /// and the caller should fall back to reconnecting.
    async fn next_message(&mut self) -> Option<Vec<u8>>;
}
