//! # machwatch-types
//!
//! Core types for machine telemetry monitoring. This crate defines the data
//! model shared by the ingestion pipeline and anything that consumes its
//! state: readings from the monitored machine, the classifier's verdicts,
//! and the snapshots that pair the two.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any
//!   serialization framework
//! - **Optional serialization**: Enable the `serde` feature as needed
//! - **Immutable values**: A reading, verdict, or snapshot never changes
//!   after construction - state evolves by replacement, not mutation
//!
//! ## Example
//!
//! ```rust
//! use machwatch_types::{ConnectionStatus, Reading, Snapshot, Verdict};
//!
//! let reading = Reading::new([10.0, 20.0, 30.0, 40.0, 50.0]);
//! let verdict = Verdict::new(0.8, true, "Active");
//! let snapshot = Snapshot::new(reading, verdict, 1700000000.0, ConnectionStatus::Subscribed);
//!
//! assert_eq!(snapshot.reading.vibration(), 10.0);
//! assert!(snapshot.verdict.is_fault);
//! ```

mod reading;
mod snapshot;
mod status;
mod verdict;

pub use reading::*;
pub use snapshot::*;
pub use status::*;
pub use verdict::*;
