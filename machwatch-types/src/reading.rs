//! Reading - one five-parameter measurement from the monitored machine.

/// Number of parameters in a machine reading.
pub const PARAM_COUNT: usize = 5;

/// A single telemetry reading from the monitored machine.
///
/// Readings carry exactly five numeric parameters in a fixed order:
/// vibration, temperature, pressure, RMS, and mean temperature. The device
/// defines the units; no range is enforced beyond being numeric. A reading
/// is immutable once constructed.
///
/// # Example
///
/// ```rust
/// use machwatch_types::Reading;
///
/// let reading = Reading::new([12.0, 65.5, 3.1, 0.8, 61.2]);
/// assert_eq!(reading.temperature(), 65.5);
/// assert_eq!(reading.params().len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Reading([f64; PARAM_COUNT]);

impl Reading {
    /// Create a reading from its five parameters.
    pub fn new(params: [f64; PARAM_COUNT]) -> Self {
        Self(params)
    }

    /// All five parameters, in wire order.
    pub fn params(&self) -> &[f64; PARAM_COUNT] {
        &self.0
    }

    /// Vibration level (parameter 0).
    pub fn vibration(&self) -> f64 {
        self.0[0]
    }

    /// Temperature (parameter 1).
    pub fn temperature(&self) -> f64 {
        self.0[1]
    }

    /// Pressure (parameter 2).
    pub fn pressure(&self) -> f64 {
        self.0[2]
    }

    /// Root-mean-square vibration (parameter 3).
    pub fn rms(&self) -> f64 {
        self.0[3]
    }

    /// Mean temperature (parameter 4).
    pub fn mean_temp(&self) -> f64 {
        self.0[4]
    }
}

impl From<[f64; PARAM_COUNT]> for Reading {
    fn from(params: [f64; PARAM_COUNT]) -> Self {
        Self::new(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_follow_wire_order() {
        let reading = Reading::new([1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(reading.vibration(), 1.0);
        assert_eq!(reading.temperature(), 2.0);
        assert_eq!(reading.pressure(), 3.0);
        assert_eq!(reading.rms(), 4.0);
        assert_eq!(reading.mean_temp(), 5.0);
    }

    #[test]
    fn params_round_trip_without_precision_loss() {
        let params = [0.1, -2.5, 1e10, f64::MIN_POSITIVE, 99.999];
        let reading = Reading::new(params);

        assert_eq!(*reading.params(), params);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_plain_array() {
        let reading = Reading::new([10.0, 20.0, 30.0, 40.0, 50.0]);

        let json = serde_json::to_string(&reading).unwrap();
        assert_eq!(json, "[10.0,20.0,30.0,40.0,50.0]");

        let parsed: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reading);
    }
}
