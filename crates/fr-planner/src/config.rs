//! Planner configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use fr_core::TimePoint;

use crate::{PlanError, PlanResult};

/// Default congestion sensitivity.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Default number of sensors per oracle batch.
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Settings shared by every planning call made through one
/// [`Planner`](crate::Planner).
///
/// Typically loaded from a JSON file by the application; missing fields
/// take their defaults, so `{}` is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Congestion sensitivity α ≥ 0.  `0` gives pure-distance routing.
    pub alpha: f64,

    /// Default time point for applications to pass to the `plan_*`
    /// methods, which always take an explicit `time` and never read this.
    pub reference_time: TimePoint,

    /// Upper bound on each sensor query in milliseconds; a batch of `n`
    /// sensors may take `n` times this.  `None` waits indefinitely.
    pub oracle_timeout_ms: Option<u64>,

    /// Maximum sensors per `estimate_batch` call.  Must be ≥ 1.
    pub batch_size: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            alpha:             DEFAULT_ALPHA,
            reference_time:    TimePoint::ZERO,
            oracle_timeout_ms: None,
            batch_size:        DEFAULT_BATCH_SIZE,
        }
    }
}

impl PlannerConfig {
    /// Reject settings that would break the non-negative-weight invariant
    /// or stall prefetching.
    pub fn validate(&self) -> PlanResult<()> {
        check_alpha(self.alpha)?;
        if self.batch_size == 0 {
            return Err(PlanError::config("batch_size must be at least 1"));
        }
        Ok(())
    }

    #[inline]
    pub fn oracle_timeout(&self) -> Option<Duration> {
        self.oracle_timeout_ms.map(Duration::from_millis)
    }
}

/// α must be finite and non-negative.
pub(crate) fn check_alpha(alpha: f64) -> PlanResult<()> {
    if alpha.is_finite() && alpha >= 0.0 {
        Ok(())
    } else {
        Err(PlanError::config(format!("alpha must be finite and >= 0, got {alpha}")))
    }
}
