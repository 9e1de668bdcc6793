//! `fr-core` — foundational types for the `flowroute` planner.
//!
//! This crate is a dependency of every other `fr-*` crate.  It has no `fr-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module    | Contents                                              |
//! |-----------|-------------------------------------------------------|
//! | [`ids`]   | `SensorId`, `NodeId`, `EdgeId`                        |
//! | [`geo`]   | `GeoPoint`, haversine distance in kilometres          |
//! | [`time`]  | `TimePoint`                                           |
//! | [`error`] | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{EARTH_RADIUS_KM, GeoPoint};
pub use ids::{EdgeId, NodeId, SensorId};
pub use time::TimePoint;
