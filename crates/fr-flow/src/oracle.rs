//! The `FlowOracle` trait: the planner's only view of the prediction model.

use fr_core::{SensorId, TimePoint};

use crate::FlowResult;

/// Estimates expected traffic volume at a sensor and time.
///
/// Implementations should be deterministic for a fixed `(sensor, time)`:
/// the adapter may query the same key from two threads and keep whichever
/// answer lands last.
///
/// Returning a negative or non-finite value is not an error here; the
/// [`FlowAdapter`](crate::FlowAdapter) rejects it as `InvalidFlow`.
///
/// # Thread safety
///
/// Edge scoring may run on Rayon workers and timed queries run on a helper
/// thread, so implementations must be `Send + Sync + 'static`.
pub trait FlowOracle: Send + Sync + 'static {
    /// Estimate flow at `sensor` at `time`.
    fn estimate(&self, sensor: SensorId, time: TimePoint) -> FlowResult<f64>;

    /// Estimate flow for several sensors at once.
    ///
    /// Must return exactly one value per input sensor, in order.  The
    /// default calls [`estimate`](Self::estimate) in a loop; override it when
    /// the backend can answer a batch more cheaply.
    fn estimate_batch(&self, sensors: &[SensorId], time: TimePoint) -> FlowResult<Vec<f64>> {
        sensors.iter().map(|&s| self.estimate(s, time)).collect()
    }
}

impl<F> FlowOracle for F
where
    F: Fn(SensorId, TimePoint) -> FlowResult<f64> + Send + Sync + 'static,
{
    fn estimate(&self, sensor: SensorId, time: TimePoint) -> FlowResult<f64> {
        self(sensor, time)
    }
}

/// A [`FlowOracle`] that reports the same flow everywhere.
///
/// `ConstantOracle(0.0)` reduces congestion weights to plain distances.
#[derive(Copy, Clone, Debug)]
pub struct ConstantOracle(pub f64);

impl FlowOracle for ConstantOracle {
    fn estimate(&self, _sensor: SensorId, _time: TimePoint) -> FlowResult<f64> {
        Ok(self.0)
    }
}
