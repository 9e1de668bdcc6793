//! Reference time points for flow estimation.
//!
//! A planning run scores every edge at one shared `TimePoint`.  The index is
//! opaque to the planner: it is whatever time slot the flow oracle was
//! trained on (typically one index per observation interval).

use std::fmt;

/// An integer time index passed through to the flow oracle.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimePoint(pub u32);

impl TimePoint {
    pub const ZERO: TimePoint = TimePoint(0);
}

impl From<u32> for TimePoint {
    #[inline]
    fn from(t: u32) -> Self {
        TimePoint(t)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}
