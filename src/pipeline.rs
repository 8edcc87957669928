//! The ingestion pipeline: validate, classify, publish, persist.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use machwatch_types::{HistoryRecord, Snapshot, Verdict};
use tracing::{debug, error, warn};

use crate::classifier::Classifier;
use crate::sink::HistorySink;
use crate::state::{HistoryRing, StateStore};
use crate::validate::validate;

/// Runs every inbound message through validation and classification, then
/// feeds the three consumers of an accepted reading in order: state store,
/// ring buffer, durable sink.
///
/// Nothing in here can take down the receive loop. Malformed payloads are
/// dropped and logged, classifier failures degrade the verdict, and sink
/// failures are logged while live state stays current. The state store
/// update and the sink append are deliberately not coupled transactionally;
/// a crash between them loses at most one record.
pub struct Pipeline {
    state: Arc<StateStore>,
    ring: Arc<HistoryRing>,
    classifier: Arc<dyn Classifier>,
    sink: Arc<dyn HistorySink>,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl Pipeline {
    /// Wire a pipeline over the shared state and the two collaborators.
    pub fn new(
        state: Arc<StateStore>,
        ring: Arc<HistoryRing>,
        classifier: Arc<dyn Classifier>,
        sink: Arc<dyn HistorySink>,
    ) -> Self {
        Self {
            state,
            ring,
            classifier,
            sink,
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Ingest one raw message body. Returns whether the reading was accepted.
    pub fn ingest(&self, payload: &[u8]) -> bool {
        let valid = match validate(payload) {
            Ok(valid) => valid,
            Err(err) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                debug!("Dropping malformed payload: {}", err);
                return false;
            }
        };

        let verdict = match self.classifier.classify(&valid.reading) {
            Ok(verdict) => verdict,
            Err(err) => {
                warn!("Classifier failed, substituting degraded verdict: {}", err);
                Verdict::degraded()
            }
        };

        let timestamp = valid.timestamp_hint.unwrap_or_else(now_epoch);
        let snapshot = Snapshot::new(valid.reading, verdict, timestamp, self.state.status());

        self.state.replace(snapshot.clone());
        self.ring.push(snapshot.clone());

        let seq = self.accepted.fetch_add(1, Ordering::Relaxed) + 1;
        if let Err(err) = self.sink.append(&HistoryRecord::new(seq, snapshot)) {
            // Live state is already current; a gap in durable history is the
            // accepted tradeoff.
            error!("History append failed for record {}: {}", seq, err);
        }
        true
    }

    /// Readings accepted since startup. Doubles as the last sequence number.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Payloads dropped by validation since startup.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("accepted", &self.accepted)
            .field("rejected", &self.rejected)
            .finish()
    }
}

/// Ingestion-side wall clock, as fractional epoch seconds.
fn now_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierError;
    use crate::sink::{RecordingSink, SinkError};
    use machwatch_types::{ConnectionStatus, Reading};

    /// Classifier returning a fixed verdict.
    struct StubClassifier(Verdict);

    impl Classifier for StubClassifier {
        fn classify(&self, _reading: &Reading) -> Result<Verdict, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    /// Classifier that always fails.
    struct BrokenClassifier;

    impl Classifier for BrokenClassifier {
        fn classify(&self, _reading: &Reading) -> Result<Verdict, ClassifierError> {
            Err(ClassifierError("model exploded".into()))
        }
    }

    /// Sink that always fails.
    struct FailingSink;

    impl HistorySink for FailingSink {
        fn append(&self, _record: &HistoryRecord) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("disk gone".into()))
        }
    }

    struct Fixture {
        state: Arc<StateStore>,
        ring: Arc<HistoryRing>,
        sink: Arc<RecordingSink>,
        pipeline: Pipeline,
    }

    fn fixture_with(classifier: Arc<dyn Classifier>) -> Fixture {
        let state = Arc::new(StateStore::new());
        let ring = Arc::new(HistoryRing::new(100));
        let sink = Arc::new(RecordingSink::new());
        let pipeline = Pipeline::new(
            state.clone(),
            ring.clone(),
            classifier,
            sink.clone() as Arc<dyn HistorySink>,
        );
        Fixture {
            state,
            ring,
            sink,
            pipeline,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(StubClassifier(Verdict::new(0.8, true, "Active"))))
    }

    #[test]
    fn accepted_reading_flows_to_all_three_consumers() {
        let f = fixture();
        f.state.set_status(ConnectionStatus::Subscribed);

        let accepted = f.pipeline.ingest(
            br#"{"parametres_machine":[10,20,30,40,50],"timestamp_epoch":1700000000}"#,
        );
        assert!(accepted);

        let current = f.state.read();
        assert_eq!(current.reading, Reading::new([10.0, 20.0, 30.0, 40.0, 50.0]));
        assert_eq!(current.verdict, Verdict::new(0.8, true, "Active"));
        assert_eq!(current.timestamp, 1700000000.0);
        assert_eq!(current.connection_status, ConnectionStatus::Subscribed);

        assert_eq!(f.ring.len(), 1);
        assert_eq!(f.sink.len(), 1);
        let record = &f.sink.records()[0];
        assert_eq!(record.seq, 1);
        assert_eq!(record.snapshot, current);
    }

    #[test]
    fn malformed_payload_touches_nothing() {
        let f = fixture();
        let before = f.state.read();

        assert!(!f.pipeline.ingest(br#"{"parametres_machine":[1,2,3,4]}"#));
        assert!(!f.pipeline.ingest(br#"{"parametres_machine":[1,2,3,4,5,6]}"#));
        assert!(!f.pipeline.ingest(br#"{"parametres_machine":[1,2,"x",4,5]}"#));
        assert!(!f.pipeline.ingest(b"garbage"));

        assert_eq!(f.state.read(), before);
        assert!(f.ring.is_empty());
        assert!(f.sink.is_empty());
        assert_eq!(f.pipeline.rejected(), 4);
        assert_eq!(f.pipeline.accepted(), 0);
    }

    #[test]
    fn string_timestamp_falls_back_to_wall_clock() {
        let f = fixture();
        let before = now_epoch();

        f.pipeline
            .ingest(br#"{"parametres_machine":[1,2,3,4,5],"timestamp":"not-a-number"}"#);

        let after = now_epoch();
        let timestamp = f.state.read().timestamp;
        assert!(timestamp >= before && timestamp <= after);
    }

    #[test]
    fn classifier_failure_degrades_instead_of_crashing() {
        let f = fixture_with(Arc::new(BrokenClassifier));

        assert!(f.pipeline.ingest(br#"{"parametres_machine":[1,2,3,4,5]}"#));

        let current = f.state.read();
        assert_eq!(current.verdict, Verdict::degraded());
        // The degraded reading still reaches the sink.
        assert_eq!(f.sink.len(), 1);
    }

    #[test]
    fn sink_failure_does_not_stop_live_updates() {
        let state = Arc::new(StateStore::new());
        let ring = Arc::new(HistoryRing::new(100));
        let pipeline = Pipeline::new(
            state.clone(),
            ring.clone(),
            Arc::new(StubClassifier(Verdict::new(0.1, false, "Active"))),
            Arc::new(FailingSink),
        );

        assert!(pipeline.ingest(br#"{"parametres_machine":[1,2,3,4,5]}"#));
        assert!(pipeline.ingest(br#"{"parametres_machine":[6,7,8,9,10]}"#));

        assert_eq!(state.read().reading, Reading::new([6.0, 7.0, 8.0, 9.0, 10.0]));
        assert_eq!(ring.len(), 2);
        assert_eq!(pipeline.accepted(), 2);
    }

    #[test]
    fn sequence_numbers_follow_arrival_order() {
        let f = fixture();
        for _ in 0..5 {
            f.pipeline.ingest(br#"{"parametres_machine":[1,2,3,4,5]}"#);
        }

        let seqs: Vec<u64> = f.sink.records().iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    }
}
