//! Planner error taxonomy.
//!
//! A planning call fails in exactly one of two ways.  "No path" is not an
//! error; see [`PlanOutcome::NoPath`](crate::PlanOutcome::NoPath).

use fr_flow::FlowError;
use fr_network::NetworkError;
use thiserror::Error;

/// Why the caller's input was rejected.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("planner configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum PlanError {
    /// Malformed graph, unknown source/target, or bad configuration.
    /// Retrying with the same input fails the same way.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// The flow oracle failed, timed out, or returned an invalid value.
    /// The whole call may be retried.
    #[error("flow oracle unavailable: {0}")]
    OracleUnavailable(#[from] FlowError),
}

impl From<NetworkError> for PlanError {
    fn from(e: NetworkError) -> Self {
        PlanError::InvalidInput(InputError::Network(e))
    }
}

impl PlanError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        PlanError::InvalidInput(InputError::Config(msg.into()))
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
