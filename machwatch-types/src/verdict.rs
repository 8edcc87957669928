//! Verdict - the classifier's judgement of one reading.

/// Output of the fault classifier for a single reading.
///
/// Verdicts are produced once per accepted reading and never modified. The
/// status label is free-form; the values the pipeline itself produces are
/// `"Initializing"` (before the first reading) and `"Error"` (when the
/// classifier failed and a degraded verdict was substituted).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Verdict {
    /// Estimated probability of a fault, in `[0, 1]`.
    pub fault_probability: f64,
    /// Whether the classifier judged the reading a fault.
    pub is_fault: bool,
    /// Status label reported by the classifier ("Active", "Error", ...).
    pub model_status: String,
}

impl Verdict {
    /// Create a verdict. The probability is clamped into `[0, 1]`.
    pub fn new(fault_probability: f64, is_fault: bool, model_status: impl Into<String>) -> Self {
        Self {
            fault_probability: fault_probability.clamp(0.0, 1.0),
            is_fault,
            model_status: model_status.into(),
        }
    }

    /// Placeholder verdict shown before any reading has been classified.
    pub fn initializing() -> Self {
        Self::new(0.0, false, "Initializing")
    }

    /// Substitute verdict installed when the classifier itself fails.
    ///
    /// A classification failure must never stop ingestion, so the pipeline
    /// degrades to this instead of propagating the error.
    pub fn degraded() -> Self {
        Self::new(0.0, false, "Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_is_clamped() {
        assert_eq!(Verdict::new(1.7, true, "Active").fault_probability, 1.0);
        assert_eq!(Verdict::new(-0.3, false, "Active").fault_probability, 0.0);
        assert_eq!(Verdict::new(0.42, false, "Active").fault_probability, 0.42);
    }

    #[test]
    fn degraded_verdict_is_benign() {
        let verdict = Verdict::degraded();

        assert_eq!(verdict.fault_probability, 0.0);
        assert!(!verdict.is_fault);
        assert_eq!(verdict.model_status, "Error");
    }
}
