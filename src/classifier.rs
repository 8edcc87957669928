//! Fault classification seam.
//!
//! The pipeline treats the classifier as an external collaborator behind the
//! [`Classifier`] trait: five numeric parameters in, one [`Verdict`] out. The
//! real diagnostic model lives elsewhere; [`ThresholdClassifier`] is the
//! built-in stand-in so the service runs without it.

use machwatch_types::{Reading, Verdict, PARAM_COUNT};
use thiserror::Error;

/// Error raised by a classifier implementation.
#[derive(Debug, Error)]
#[error("classification failed: {0}")]
pub struct ClassifierError(pub String);

/// Fault classifier for machine readings.
///
/// Implementations must tolerate arbitrary numeric ranges (the caller does
/// not normalize input), must be side-effect-free from the pipeline's point
/// of view, and must be bounded in time: the receive loop invokes `classify`
/// inline for every accepted reading. A returned error never stops ingestion;
/// the pipeline substitutes [`Verdict::degraded`] and carries on.
pub trait Classifier: Send + Sync {
    /// Classify one reading.
    fn classify(&self, reading: &Reading) -> Result<Verdict, ClassifierError>;
}

/// Threshold-based classifier used when no external model is wired in.
///
/// Each parameter contributes `min(value / threshold, 1)` to the score and
/// the fault probability is the average contribution, so a reading with
/// every parameter at or past its threshold scores 1.0. A reading is judged
/// a fault at probability 0.5 or above.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdClassifier {
    thresholds: [f64; PARAM_COUNT],
}

impl ThresholdClassifier {
    /// Create a classifier with one warning threshold per parameter.
    /// Thresholds must be positive.
    pub fn new(thresholds: [f64; PARAM_COUNT]) -> Self {
        debug_assert!(thresholds.iter().all(|t| *t > 0.0));
        Self { thresholds }
    }
}

impl Default for ThresholdClassifier {
    /// Thresholds tuned for the demo device, which publishes values 1-100.
    fn default() -> Self {
        Self::new([80.0; PARAM_COUNT])
    }
}

impl Classifier for ThresholdClassifier {
    fn classify(&self, reading: &Reading) -> Result<Verdict, ClassifierError> {
        let mut score = 0.0;
        for (i, (value, threshold)) in reading
            .params()
            .iter()
            .zip(self.thresholds.iter())
            .enumerate()
        {
            if !value.is_finite() {
                return Err(ClassifierError(format!(
                    "parameter {i} is not finite: {value}"
                )));
            }
            score += (value / threshold).clamp(0.0, 1.0);
        }

        let probability = score / PARAM_COUNT as f64;
        Ok(Verdict::new(probability, probability >= 0.5, "Active"))
    }
}
