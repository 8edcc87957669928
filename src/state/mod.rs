//! Shared live state: the current snapshot, the recent-history ring, and the
//! read handle everything outside the ingest task goes through.

mod ring;
mod store;

pub use ring::{HistoryRing, DEFAULT_CAPACITY};
pub use store::StateStore;

use std::sync::Arc;

use machwatch_types::{ConnectionStatus, Snapshot};

/// Cheap-to-clone read handle over the live state.
///
/// This is the state-query interface consumed by the hosting application's
/// request handlers. Every call returns a best-effort answer - possibly
/// stale, possibly carrying a degraded model status - never an error, and
/// never blocks the ingest task beyond a lock hold.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use machwatch::state::{HistoryRing, MonitorHandle, StateStore};
///
/// let state = Arc::new(StateStore::new());
/// let ring = Arc::new(HistoryRing::new(100));
/// let handle = MonitorHandle::new(state, ring);
///
/// let current = handle.read_current();
/// assert!(!handle.connection_status().is_connected());
/// ```
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    state: Arc<StateStore>,
    ring: Arc<HistoryRing>,
}

impl MonitorHandle {
    /// Create a handle over the shared state.
    pub fn new(state: Arc<StateStore>, ring: Arc<HistoryRing>) -> Self {
        Self { state, ring }
    }

    /// Copy of the current authoritative snapshot.
    pub fn read_current(&self) -> Snapshot {
        self.state.read()
    }

    /// The last `k` accepted snapshots, oldest first.
    pub fn read_recent(&self, k: usize) -> Vec<Snapshot> {
        self.ring.recent(k)
    }

    /// Current transport connection status.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.state.status()
    }

    /// Fraction of the last `k` snapshots judged faulty.
    pub fn fault_rate(&self, k: usize) -> Option<f64> {
        self.ring.fault_rate(k)
    }
}
