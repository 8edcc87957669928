//! Connection lifecycle: connect, subscribe, receive, reconnect.

use std::sync::Arc;
use std::time::Duration;

use machwatch_types::ConnectionStatus;
use tracing::{debug, info, warn};

use super::{Transport, TransportError};
use crate::pipeline::Pipeline;
use crate::state::StateStore;

/// How long to wait between reconnection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Same delay after every failure.
    Fixed(Duration),
    /// Delay doubles after each consecutive failure, up to `cap`.
    Exponential { base: Duration, cap: Duration },
}

/// Reconnection delay state for one connection manager.
///
/// Kept explicit (rather than a sleep constant inside the loop) so tests can
/// exercise the policy on its own and drive the manager with a paused clock.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    attempt: u32,
}

impl Backoff {
    /// Create a backoff with the given policy.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Delay to wait before the next attempt, advancing the attempt count.
    pub fn next_delay(&mut self) -> Duration {
        let delay = match self.policy {
            BackoffPolicy::Fixed(delay) => delay,
            BackoffPolicy::Exponential { base, cap } => {
                let factor = 1u32 << self.attempt.min(16);
                cap.min(base.saturating_mul(factor))
            }
        };
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Forget past failures. Called after a successful subscription.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(BackoffPolicy::Fixed(Duration::from_secs(5)))
    }
}

/// Owns the subscribe-side connection lifecycle.
///
/// Drives `Disconnected -> Connecting -> Subscribed -> (receiving)* ->
/// Disconnected` forever. Any transport-level disconnect drops back to
/// `Disconnected`, waits out the backoff, and tries again - there is no
/// retry limit, since the service is expected to outlive transient broker
/// outages. Every transition is reflected in the state store immediately, so
/// observers see the status change without waiting for a new reading.
pub struct ConnectionManager<T: Transport> {
    transport: T,
    subject: String,
    pipeline: Arc<Pipeline>,
    state: Arc<StateStore>,
    backoff: Backoff,
}

impl<T: Transport> ConnectionManager<T> {
    /// Create a manager over the given transport and subject.
    pub fn new(
        transport: T,
        subject: impl Into<String>,
        pipeline: Arc<Pipeline>,
        state: Arc<StateStore>,
        backoff: Backoff,
    ) -> Self {
        Self {
            transport,
            subject: subject.into(),
            pipeline,
            state,
            backoff,
        }
    }

    /// Drive the connection state machine indefinitely.
    ///
    /// Blocks only on transport I/O and the backoff sleep; per-message work
    /// is handed to [`Pipeline::ingest`], which is bounded.
    pub async fn run(mut self) {
        loop {
            self.state.set_status(ConnectionStatus::Connecting);
            match self.connect_and_receive().await {
                Ok(()) => {
                    warn!("Connection to broker lost");
                    self.state.set_status(ConnectionStatus::Disconnected);
                }
                Err(TransportError::Subscribe(err)) => {
                    warn!("Subscription to '{}' refused: {}", self.subject, err);
                    self.state.set_status(ConnectionStatus::SubscribeFailed);
                }
                Err(err) => {
                    warn!("Connection attempt failed: {}", err);
                    self.state.set_status(ConnectionStatus::Disconnected);
                }
            }

            let delay = self.backoff.next_delay();
            debug!("Retrying in {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }

    /// One session: connect, subscribe, then drain messages until the
    /// connection drops. Returning `Ok` means the session ended cleanly at
    /// the transport level (stream exhausted), not that it should stop.
    async fn connect_and_receive(&mut self) -> Result<(), TransportError> {
        let mut conn = self.transport.connect().await?;
        conn.subscribe(&self.subject).await?;

        self.state.set_status(ConnectionStatus::Subscribed);
        self.backoff.reset();
        info!("Subscribed to '{}'", self.subject);

        while let Some(payload) = conn.next_message().await {
            self.pipeline.ingest(&payload);
        }
        Ok(())
    }
}
