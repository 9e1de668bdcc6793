//! `fr-planner` — congestion-aware route planning between sensors.
//!
//! # Pipeline
//!
//! ```text
//! plan_route(nodes, edges, source, target, time, alpha):
//!   ① Build     : validate records, build the SensorGraph (InvalidInput).
//!   ② Resolve   : source and target must exist (InvalidInput, no oracle call).
//!   ③ Prefetch  : batch-query flow for every incident sensor at `time`.
//!   ④ Score     : weight = d · (1 + α · avg(flow_u, flow_v)) per edge
//!                 (parallel with the `parallel` feature).
//!   ⑤ Search    : Dijkstra over the frozen weights → Found | NoPath.
//! ```
//!
//! Every call owns a fresh [`FlowAdapter`](fr_flow::FlowAdapter); no flow
//! estimate outlives the call that fetched it.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`config`]  | `PlannerConfig` — α, reference time, timeout, batch size   |
//! | [`scorer`]  | `congestion_weight`, `score_edges`                         |
//! | [`planner`] | `Planner`, `PlanOutcome`, `plan_route` convenience fn      |
//! | [`report`]  | `RouteReport`, `RouteLeg`, `CongestionLevel`               |
//! | [`error`]   | `PlanError`, `InputError`, `PlanResult<T>`                 |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Scores edges on Rayon's thread pool (default).          |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fr_flow::ConstantOracle;
//! use fr_planner::{Planner, PlannerConfig};
//!
//! let planner = Planner::new(PlannerConfig::default(), Arc::new(ConstantOracle(10.0)));
//! let outcome = planner.plan_route(&nodes, &edges, source, target, time, None)?;
//! ```

pub mod config;
pub mod error;
pub mod planner;
pub mod report;
pub mod scorer;

#[cfg(test)]
mod tests;

pub use config::PlannerConfig;
pub use error::{InputError, PlanError, PlanResult};
pub use planner::{PlanOutcome, Planner, plan_route};
pub use report::{CongestionLevel, RouteLeg, RouteReport};
pub use scorer::{congestion_weight, score_edges};
