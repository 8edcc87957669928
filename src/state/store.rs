//! Latest-snapshot cache shared between the ingest task and readers.

use machwatch_types::{ConnectionStatus, Snapshot};
use parking_lot::RwLock;

/// Thread-safe holder of the current authoritative snapshot.
///
/// Single writer (the receive loop), any number of readers. A write installs
/// a whole snapshot, so a reader can never observe a reading paired with
/// another message's verdict. Writer critical sections are copy-in/copy-out;
/// the writer never waits on a reader doing anything but the lock hold
/// itself.
#[derive(Debug, Default)]
pub struct StateStore {
    current: RwLock<Snapshot>,
}

impl StateStore {
    /// Create a store holding the placeholder initial snapshot.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Snapshot::initial()),
        }
    }

    /// Atomically install a new current snapshot, replacing the prior one
    /// wholesale.
    pub fn replace(&self, snapshot: Snapshot) {
        *self.current.write() = snapshot;
    }

    /// Immutable copy of the current snapshot. Never observes a partial
    /// write.
    pub fn read(&self) -> Snapshot {
        self.current.read().clone()
    }

    /// Update only the connection status, independent of reading updates.
    pub fn set_status(&self, status: ConnectionStatus) {
        self.current.write().connection_status = status;
    }

    /// The connection status of the current snapshot.
    pub fn status(&self) -> ConnectionStatus {
        self.current.read().connection_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use machwatch_types::{Reading, Verdict};
    use std::sync::Arc;

    fn snapshot_for(marker: f64) -> Snapshot {
        Snapshot::new(
            Reading::new([marker; 5]),
            Verdict::new((marker % 100.0) / 100.0, marker as u64 % 2 == 0, "Active"),
            marker,
            ConnectionStatus::Subscribed,
        )
    }

    #[test]
    fn replace_then_read_returns_exact_snapshot() {
        let store = StateStore::new();
        let snapshot = Snapshot::new(
            Reading::new([10.0, 20.0, 30.0, 40.0, 50.0]),
            Verdict::new(0.8, true, "Active"),
            1700000000.0,
            ConnectionStatus::Subscribed,
        );

        store.replace(snapshot.clone());

        assert_eq!(store.read(), snapshot);
        // The five fields keep their wire order and precision.
        assert_eq!(store.read().reading.params(), &[10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn new_store_holds_initial_snapshot() {
        let store = StateStore::new();

        assert_eq!(store.read(), Snapshot::initial());
        assert_eq!(store.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn set_status_leaves_reading_untouched() {
        let store = StateStore::new();
        store.replace(snapshot_for(7.0));

        store.set_status(ConnectionStatus::Disconnected);

        let current = store.read();
        assert_eq!(current.connection_status, ConnectionStatus::Disconnected);
        assert_eq!(current.reading, Reading::new([7.0; 5]));
        assert_eq!(current.timestamp, 7.0);
    }

    #[test]
    fn concurrent_readers_never_see_torn_snapshots() {
        use std::thread;

        let store = Arc::new(StateStore::new());
        store.replace(snapshot_for(0.0));

        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for i in 1..=1000 {
                    store.replace(snapshot_for(i as f64));
                }
            })
        };

        let mut readers = vec![];
        for _ in 0..4 {
            let store = store.clone();
            readers.push(thread::spawn(move || {
                for _ in 0..1000 {
                    let snapshot = store.read();
                    let marker = snapshot.timestamp;
                    // Every field of the snapshot must come from the same
                    // replace call.
                    assert_eq!(snapshot.reading, Reading::new([marker; 5]));
                    assert_eq!(
                        snapshot.verdict,
                        Verdict::new((marker % 100.0) / 100.0, marker as u64 % 2 == 0, "Active")
                    );
                }
            }));
        }

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
