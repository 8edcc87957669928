//! Connection status of the telemetry subscription.

use core::fmt;

/// Where the subscribe-side transport connection currently stands.
///
/// Exposed alongside the latest snapshot so observers can tell "stale data
/// because disconnected" apart from "stale data because the device is idle".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConnectionStatus {
    /// No broker connection; a reconnection attempt is pending.
    #[default]
    Disconnected,
    /// Connection handshake in progress.
    Connecting,
    /// Connected and receiving telemetry.
    Subscribed,
    /// Connected to the broker, but the subscription was refused.
    SubscribeFailed,
}

impl ConnectionStatus {
    /// True when telemetry can actually arrive.
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Subscribed)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Subscribed => "subscribed",
            Self::SubscribeFailed => "subscribe-failed",
        };
        f.write_str(label)
    }
}
