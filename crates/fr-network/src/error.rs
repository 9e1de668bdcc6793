//! Network-subsystem error type.
//!
//! Every variant is a load-time or query-time input problem; the planner
//! surfaces all of them as `InvalidInput`.

use thiserror::Error;

use fr_core::SensorId;

/// Errors produced by `fr-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("sensor {sensor} has invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { sensor: SensorId, lat: f64, lon: f64 },

    #[error("sensor {0} appears more than once in the node list")]
    DuplicateSensor(SensorId),

    #[error("edge {from}–{to} references unknown sensor {missing}")]
    UnknownEndpoint { from: SensorId, to: SensorId, missing: SensorId },

    #[error("edge {0}–{0} is a self-loop")]
    SelfLoop(SensorId),

    #[error("edge {a}–{b} appears more than once")]
    DuplicateEdge { a: SensorId, b: SensorId },

    #[error("sensor {0} not found in graph")]
    UnknownSensor(SensorId),

    #[error("expected {expected} edge weights, got {got}")]
    WeightCountMismatch { expected: usize, got: usize },

    #[error("edge {edge} has invalid weight {weight}")]
    InvalidWeight { edge: usize, weight: f64 },

    #[error("record parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
