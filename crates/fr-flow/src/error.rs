use std::time::Duration;

use thiserror::Error;

use fr_core::{SensorId, TimePoint};

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("sensor {0} is unknown to the flow oracle")]
    UnknownSensor(SensorId),

    #[error("flow oracle unavailable for sensor {sensor} at {time}: {reason}")]
    Unavailable {
        sensor: SensorId,
        time:   TimePoint,
        reason: String,
    },

    #[error("flow oracle returned invalid flow {value} for sensor {sensor} at {time}")]
    InvalidFlow {
        sensor: SensorId,
        time:   TimePoint,
        value:  f64,
    },

    #[error("flow oracle did not answer within {timeout:?} at {time}")]
    Timeout { time: TimePoint, timeout: Duration },

    #[error("flow oracle worker exited without answering at {time}")]
    WorkerLost { time: TimePoint },

    #[error("congestion weight overflows for edge {from}–{to} at {time} (flows {flow_from}, {flow_to})")]
    WeightOverflow {
        from:      SensorId,
        to:        SensorId,
        time:      TimePoint,
        flow_from: f64,
        flow_to:   f64,
    },

    #[error("flow oracle returned {got} estimates for {expected} sensors")]
    BatchSizeMismatch { expected: usize, got: usize },

    #[error("flow table parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "http")]
    #[error("HTTP client error: {0}")]
    Http(String),
}

pub type FlowResult<T> = Result<T, FlowError>;
