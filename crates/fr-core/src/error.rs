//! Base error type.
//!
//! Sub-crates define their own error enums; `fr-network` reports a bad
//! coordinate with the offending sensor attached instead of wrapping this.

use thiserror::Error;

/// Errors produced by `fr-core` validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("coordinate ({lat}, {lon}) is outside latitude [-90, 90] / longitude [-180, 180]")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

/// Shorthand result type for `fr-core`.
pub type CoreResult<T> = Result<T, CoreError>;
