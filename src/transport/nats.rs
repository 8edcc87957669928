//! NATS-backed transport.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc;

use super::{Transport, TransportConnection, TransportError};

/// Transport that connects to a NATS server.
///
/// The client performs no internal reconnection: a dropped connection ends
/// the session (`next_message` returns `None`) so the caller's own state
/// machine observes the disconnect and drives the retry.
///
/// # Example
///
/// ```rust,no_run
/// use machwatch::transport::{NatsTransport, Transport};
///
/// # tokio_test::block_on(async {
/// let transport = NatsTransport::builder()
///     .url("nats://localhost:4222")
///     .build();
///
/// let mut conn = transport.connect().await?;
/// conn.subscribe("diagnostic_machine").await?;
/// # Ok::<(), machwatch::transport::TransportError>(())
/// # });
/// ```
pub struct NatsTransport {
    url: String,
    credentials: Option<String>,
}

impl NatsTransport {
    /// Create a new builder for configuring the transport.
    pub fn builder() -> NatsTransportBuilder {
        NatsTransportBuilder::default()
    }

    /// The broker URL this transport connects to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for NatsTransport {
    async fn connect(&self) -> Result<Box<dyn TransportConnection>, TransportError> {
        let (events_tx, events) = mpsc::unbounded_channel();
        // Reconnection is owned by the caller, so the client gets no retries
        // of its own, and lifecycle events feed the receive loop: without
        // them the subscriber stream pends through an outage instead of
        // ending.
        let mut options = async_nats::ConnectOptions::new()
            .max_reconnects(0)
            .event_callback(move |event| {
                let events_tx = events_tx.clone();
                async move {
                    let _ = events_tx.send(event);
                }
            });
        if let Some(creds) = &self.credentials {
            options = options
                .credentials_file(creds)
                .await
                .map_err(|e| TransportError::Auth(e.to_string()))?;
        }
        let client = options
            .connect(&self.url)
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Box::new(NatsConnection {
            client,
            subscriber: None,
            events,
        }))
    }
}

impl std::fmt::Debug for NatsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsTransport").field("url", &self.url).finish()
    }
}

struct NatsConnection {
    client: async_nats::Client,
    subscriber: Option<async_nats::Subscriber>,
    events: mpsc::UnboundedReceiver<async_nats::Event>,
}

/// Whether a client lifecycle event means this session is over.
fn session_ended(event: &async_nats::Event) -> bool {
    matches!(
        event,
        async_nats::Event::Disconnected
            | async_nats::Event::ClientError(async_nats::ClientError::MaxReconnects)
    )
}

/// Next lifecycle event; pends forever once the callback side is gone.
async fn next_event(events: &mut mpsc::UnboundedReceiver<async_nats::Event>) -> async_nats::Event {
    match events.recv().await {
        Some(event) => event,
        None => futures_util::future::pending().await,
    }
}

#[async_trait]
impl TransportConnection for NatsConnection {
    async fn subscribe(&mut self, subject: &str) -> Result<(), TransportError> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| TransportError::Subscribe(e.to_string()))?;
        self.subscriber = Some(subscriber);
        Ok(())
    }

    async fn next_message(&mut self) -> Option<Vec<u8>> {
        let subscriber = self.subscriber.as_mut()?;
        loop {
            tokio::select! {
                message = subscriber.next() => {
                    return message.map(|msg| msg.payload.to_vec());
                }
                event = next_event(&mut self.events) => {
                    if session_ended(&event) {
                        return None;
                    }
                }
            }
        }
    }
}

/// Builder for [`NatsTransport`].
#[derive(Debug, Default)]
pub struct NatsTransportBuilder {
    url: Option<String>,
    credentials: Option<String>,
}

impl NatsTransportBuilder {
    /// Set the NATS server URL (default: "nats://localhost:4222").
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the path to a credentials file for authentication.
    pub fn credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials = Some(path.into());
        self
    }

    /// Build the transport.
    pub fn build(self) -> NatsTransport {
        NatsTransport {
            url: self
                .url
                .unwrap_or_else(|| "nats://localhost:4222".to_string()),
            credentials: self.credentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_localhost() {
        let transport = NatsTransport::builder().build();
        assert_eq!(transport.url(), "nats://localhost:4222");
    }

    #[test]
    fn builder_applies_overrides() {
        let transport = NatsTransport::builder()
            .url("nats://broker.example:4222")
            .credentials_file("/etc/machwatch/nats.creds")
            .build();

        assert_eq!(transport.url(), "nats://broker.example:4222");
        assert_eq!(
            transport.credentials.as_deref(),
            Some("/etc/machwatch/nats.creds")
        );
    }

    #[test]
    fn disconnect_events_end_the_session() {
        assert!(session_ended(&async_nats::Event::Disconnected));
        assert!(session_ended(&async_nats::Event::ClientError(
            async_nats::ClientError::MaxReconnects
        )));

        assert!(!session_ended(&async_nats::Event::Connected));
        assert!(!session_ended(&async_nats::Event::LameDuckMode));
    }

    #[tokio::test]
    async fn exhausted_event_stream_pends_instead_of_looping() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<async_nats::Event>();
        tx.send(async_nats::Event::Connected).unwrap();
        drop(tx);

        assert!(!session_ended(&next_event(&mut rx).await));
        // The closed channel must never yield again.
        let pending = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            next_event(&mut rx),
        )
        .await;
        assert!(pending.is_err());
    }
}
