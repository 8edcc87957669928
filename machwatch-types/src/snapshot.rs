//! Snapshot - the most recently accepted observation.

use crate::{ConnectionStatus, Reading, Verdict};

/// The authoritative "latest known state": one reading, its verdict, when it
/// was taken, and the transport status at that moment.
///
/// Exactly one snapshot is current at any instant. A snapshot is created the
/// moment a valid reading clears classification and is only ever superseded,
/// never mutated in place.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// The accepted reading.
    pub reading: Reading,
    /// The classifier's verdict for that reading.
    pub verdict: Verdict,
    /// Seconds since the Unix epoch - the device clock when the payload
    /// carried one, the ingestion clock otherwise. Always numeric so
    /// consumers can format it consistently.
    pub timestamp: f64,
    /// Transport status when the snapshot was installed.
    pub connection_status: ConnectionStatus,
}

impl Snapshot {
    /// Create a snapshot.
    pub fn new(
        reading: Reading,
        verdict: Verdict,
        timestamp: f64,
        connection_status: ConnectionStatus,
    ) -> Self {
        Self {
            reading,
            verdict,
            timestamp,
            connection_status,
        }
    }

    /// The placeholder current snapshot before the first reading arrives.
    pub fn initial() -> Self {
        Self::new(
            Reading::default(),
            Verdict::initializing(),
            0.0,
            ConnectionStatus::Disconnected,
        )
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::initial()
    }
}

/// A snapshot plus its position in the durable history.
///
/// The sequence number is assigned by the pipeline, increases monotonically,
/// and matches arrival order: every accepted reading yields exactly one
/// record. Records are never mutated or deleted by the ingestion path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryRecord {
    /// Monotonically increasing identifier, starting at 1.
    pub seq: u64,
    /// The snapshot as it was installed.
    pub snapshot: Snapshot,
}

impl HistoryRecord {
    /// Pair a snapshot with its sequence number.
    pub fn new(seq: u64, snapshot: Snapshot) -> Self {
        Self { seq, snapshot }
    }
}
