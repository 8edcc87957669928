//! Inbound payload validation.
//!
//! Telemetry arrives as UTF-8 JSON published by the device. Everything that
//! crosses into the state store or the history sink goes through [`validate`]
//! first: a payload either becomes a strongly-typed [`Reading`] here or it is
//! rejected and never touches shared state. There is no negative
//! acknowledgment at this layer - rejects are logged by the caller and
//! dropped.

use machwatch_types::{Reading, PARAM_COUNT};
use serde_json::Value;
use thiserror::Error;

/// Wire field holding the five-parameter array.
pub const PARAMS_FIELD: &str = "parametres_machine";
/// Wire field holding the epoch-numeric timestamp.
pub const EPOCH_FIELD: &str = "timestamp_epoch";
/// Wire field holding the secondary timestamp, which the device may publish
/// as an already-formatted string.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Why a payload was rejected.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The payload body was not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The parameter array field was absent (or not an array).
    #[error("payload has no 'parametres_machine' array")]
    MissingParams,

    /// The parameter array had the wrong number of elements.
    #[error("expected 5 parameters, got {0}")]
    WrongLength(usize),

    /// A parameter failed numeric coercion.
    #[error("parameter {0} is not numeric")]
    NonNumeric(usize),
}

/// A payload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidReading {
    /// The typed reading.
    pub reading: Reading,
    /// Epoch timestamp carried by the payload, when it had a numeric one.
    /// `None` means the pipeline stamps ingestion wall-clock time instead.
    pub timestamp_hint: Option<f64>,
}

/// Validate a raw message body into a typed reading.
///
/// The timestamp hint prefers the explicit `timestamp_epoch` field and falls
/// back to `timestamp` only when that is numeric. A pre-formatted string
/// timestamp is discarded, so downstream consumers always see an epoch they
/// can format consistently.
///
/// # Example
///
/// ```rust
/// use machwatch::validate::validate;
///
/// let body = br#"{"parametres_machine":[10,20,30,40,50],"timestamp_epoch":1700000000}"#;
/// let valid = validate(body).unwrap();
///
/// assert_eq!(valid.reading.params(), &[10.0, 20.0, 30.0, 40.0, 50.0]);
/// assert_eq!(valid.timestamp_hint, Some(1700000000.0));
/// ```
pub fn validate(payload: &[u8]) -> Result<ValidReading, ValidateError> {
    let body: Value = serde_json::from_slice(payload)?;

    let params = body
        .get(PARAMS_FIELD)
        .and_then(Value::as_array)
        .ok_or(ValidateError::MissingParams)?;

    if params.len() != PARAM_COUNT {
        return Err(ValidateError::WrongLength(params.len()));
    }

    let mut values = [0.0; PARAM_COUNT];
    for (i, value) in params.iter().enumerate() {
        values[i] = value.as_f64().ok_or(ValidateError::NonNumeric(i))?;
    }

    let timestamp_hint = body
        .get(EPOCH_FIELD)
        .and_then(Value::as_f64)
        .or_else(|| body.get(TIMESTAMP_FIELD).and_then(Value::as_f64));

    Ok(ValidReading {
        reading: Reading::new(values),
        timestamp_hint,
    })
}
