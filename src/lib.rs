//! # machwatch
//!
//! Machine fault monitor: subscribes to device telemetry over a pub/sub
//! broker, classifies every reading, and keeps the latest state plus a
//! bounded history available to any number of concurrent readers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Ingestion task                            │
//! │  ┌───────────┐   ┌──────────┐   ┌────────────┐   ┌────────────┐  │
//! │  │ transport │──▶│ validate │──▶│ classifier │──▶│  pipeline  │  │
//! │  │ (manager) │   │          │   │            │   │            │  │
//! │  └───────────┘   └──────────┘   └────────────┘   └─────┬──────┘  │
//! └─────────────────────────────────────────────────────────┼────────┘
//!                                                           │
//!                         ┌────────────────┬────────────────┤
//!                         ▼                ▼                ▼
//!                  ┌────────────┐   ┌─────────────┐  ┌─────────────┐
//!                  │ StateStore │   │ HistoryRing │  │ SQLite sink │
//!                  │  (latest)  │   │ (recent N)  │  │ (append)    │
//!                  └─────┬──────┘   └──────┬──────┘  └─────────────┘
//!                        └────────┬────────┘
//!                                 ▼
//!                        MonitorHandle (readers)
//! ```
//!
//! - **[`transport`]**: broker abstraction, the NATS implementation, and the
//!   connection manager that reconnects forever with an explicit backoff
//! - **[`validate`]**: turns untyped payloads into typed readings at the
//!   boundary; nothing malformed crosses into shared state
//! - **[`classifier`]**: the fault-model seam; failures degrade, never crash
//! - **[`pipeline`]**: fans an accepted reading out to the state store, the
//!   ring buffer, and the durable sink
//! - **[`state`]**: single-writer/many-reader live state and the query handle
//! - **[`sink`]**: append-only durable history (SQLite)
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use machwatch::{
//!     HistoryRing, MonitorHandle, Pipeline, RecordingSink, StateStore, ThresholdClassifier,
//! };
//!
//! let state = Arc::new(StateStore::new());
//! let ring = Arc::new(HistoryRing::new(100));
//! let pipeline = Pipeline::new(
//!     state.clone(),
//!     ring.clone(),
//!     Arc::new(ThresholdClassifier::default()),
//!     Arc::new(RecordingSink::new()),
//! );
//!
//! pipeline.ingest(br#"{"parametres_machine":[10,20,30,40,50],"timestamp_epoch":1700000000}"#);
//!
//! let handle = MonitorHandle::new(state, ring);
//! assert_eq!(handle.read_current().timestamp, 1700000000.0);
//! ```

pub mod classifier;
pub mod config;
pub mod pipeline;
pub mod sink;
pub mod state;
pub mod transport;
pub mod validate;

pub use classifier::{Classifier, ClassifierError, ThresholdClassifier};
pub use pipeline::Pipeline;
pub use sink::{HistorySink, NullSink, RecordingSink, SinkError, SqliteSink};
pub use state::{HistoryRing, MonitorHandle, StateStore};
pub use transport::{
    Backoff, BackoffPolicy, ConnectionManager, NatsTransport, Transport, TransportConnection,
    TransportError,
};
pub use validate::{validate, ValidReading, ValidateError};

// Re-export the data model for convenience.
pub use machwatch_types::{ConnectionStatus, HistoryRecord, Reading, Snapshot, Verdict};
