//! Bounded in-memory history of recent snapshots.

use std::collections::VecDeque;

use machwatch_types::Snapshot;
use parking_lot::RwLock;

/// Default number of snapshots retained.
pub const DEFAULT_CAPACITY: usize = 100;

/// Most-recent-N history of accepted snapshots.
///
/// Insertion order is arrival order; pushing onto a full ring evicts the
/// oldest entry (FIFO, O(1) amortized). Used for rolling statistics such as
/// the recent fault rate, without a round trip to the durable store.
#[derive(Debug)]
pub struct HistoryRing {
    capacity: usize,
    entries: RwLock<VecDeque<Snapshot>>,
}

impl HistoryRing {
    /// Create a ring holding at most `capacity` snapshots (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append a snapshot, evicting the oldest entry when full.
    pub fn push(&self, snapshot: Snapshot) {
        let mut entries = self.entries.write();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(snapshot);
    }

    /// Number of snapshots currently held.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when no snapshot has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Maximum number of snapshots retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The last `k` snapshots in arrival order, as an immutable copy.
    /// Returns fewer when the ring holds fewer.
    pub fn recent(&self, k: usize) -> Vec<Snapshot> {
        let entries = self.entries.read();
        let skip = entries.len().saturating_sub(k);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Fraction of the last `k` snapshots judged faulty, or `None` when the
    /// ring is empty.
    pub fn fault_rate(&self, k: usize) -> Option<f64> {
        let recent = self.recent(k);
        if recent.is_empty() {
            return None;
        }
        let faults = recent.iter().filter(|s| s.verdict.is_fault).count();
        Some(faults as f64 / recent.len() as f64)
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use machwatch_types::{ConnectionStatus, Reading, Verdict};

    fn snapshot(n: f64, is_fault: bool) -> Snapshot {
        Snapshot::new(
            Reading::new([n; 5]),
            Verdict::new(if is_fault { 0.9 } else { 0.1 }, is_fault, "Active"),
            n,
            ConnectionStatus::Subscribed,
        )
    }

    #[test]
    fn size_tracks_pushes_below_capacity() {
        let ring = HistoryRing::new(10);
        for i in 0..7 {
            ring.push(snapshot(i as f64, false));
        }

        assert_eq!(ring.len(), 7);
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        let ring = HistoryRing::new(3);
        for i in 0..10 {
            ring.push(snapshot(i as f64, false));
        }

        assert_eq!(ring.len(), 3);
        let recent = ring.recent(3);
        let timestamps: Vec<f64> = recent.iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn recent_returns_last_k_in_arrival_order() {
        let ring = HistoryRing::new(100);
        for i in 0..20 {
            ring.push(snapshot(i as f64, false));
        }

        let recent = ring.recent(5);
        let timestamps: Vec<f64> = recent.iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![15.0, 16.0, 17.0, 18.0, 19.0]);
    }

    #[test]
    fn recent_with_k_larger_than_len_returns_everything() {
        let ring = HistoryRing::new(100);
        ring.push(snapshot(1.0, false));
        ring.push(snapshot(2.0, false));

        assert_eq!(ring.recent(50).len(), 2);
    }

    #[test]
    fn fault_rate_over_recent_entries() {
        let ring = HistoryRing::new(100);
        // 6 healthy, then 4 faulty.
        for i in 0..6 {
            ring.push(snapshot(i as f64, false));
        }
        for i in 6..10 {
            ring.push(snapshot(i as f64, true));
        }

        assert_eq!(ring.fault_rate(10), Some(0.4));
        assert_eq!(ring.fault_rate(4), Some(1.0));
        assert_eq!(HistoryRing::new(10).fault_rate(10), None);
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let ring = HistoryRing::new(0);
        ring.push(snapshot(1.0, false));
        ring.push(snapshot(2.0, false));

        assert_eq!(ring.capacity(), 1);
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.recent(1)[0].timestamp, 2.0);
    }
}
