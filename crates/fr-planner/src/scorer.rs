//! Congestion scoring: physical distance plus endpoint flow → edge weight.

use fr_core::{EdgeId, TimePoint};
use fr_flow::{FlowAdapter, FlowError, FlowResult};
use fr_network::SensorGraph;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// `distance_km · (1 + α · (flow_u + flow_v) / 2)`.
///
/// With `α, flow ≥ 0` the result is never below `distance_km`, and equals
/// it exactly when `α = 0` or both flows are zero.  The flows are halved
/// before they are added, so two finite flows never overflow the average.
/// The product can still be infinite for extreme inputs.
#[inline]
pub fn congestion_weight(distance_km: f64, flow_u: f64, flow_v: f64, alpha: f64) -> f64 {
    distance_km * (1.0 + alpha * (flow_u / 2.0 + flow_v / 2.0))
}

/// Weight of one edge at `time`.
fn score_edge(graph: &SensorGraph, flows: &FlowAdapter, edge: EdgeId, time: TimePoint, alpha: f64) -> FlowResult<f64> {
    let (u, v) = graph.edge_sensors(edge);
    let flow_u = flows.estimate(u, time)?;
    let flow_v = flows.estimate(v, time)?;
    let weight = congestion_weight(graph.edge_distance_km[edge.index()], flow_u, flow_v, alpha);
    if !weight.is_finite() {
        log::warn!("edge {u}–{v} at {time}: congestion weight overflows (flows {flow_u}, {flow_v})");
        return Err(FlowError::WeightOverflow { from: u, to: v, time, flow_from: flow_u, flow_to: flow_v });
    }
    Ok(weight)
}

/// Score every edge of `graph`, indexed by `EdgeId`.
///
/// All flow lookups use the single reference `time`.  The first oracle
/// failure, or a flow large enough to push a weight to infinity, aborts
/// scoring; no partially scored weight vector is returned.
///
/// With the `parallel` Cargo feature, edges are scored on Rayon's thread
/// pool.  Each worker writes only its own slot of the output, and the
/// adapter's cache is the only shared state.
pub fn score_edges(graph: &SensorGraph, flows: &FlowAdapter, time: TimePoint, alpha: f64) -> FlowResult<Vec<f64>> {
    let edge_count = graph.edge_count() as u32;

    #[cfg(not(feature = "parallel"))]
    {
        (0..edge_count)
            .map(|e| score_edge(graph, flows, EdgeId(e), time, alpha))
            .collect()
    }

    #[cfg(feature = "parallel")]
    {
        (0..edge_count)
            .into_par_iter()
            .map(|e| score_edge(graph, flows, EdgeId(e), time, alpha))
            .collect()
    }
}
