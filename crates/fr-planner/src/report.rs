//! Per-leg breakdown of a planned route.

use std::fmt;

use serde::Serialize;

use fr_core::{SensorId, TimePoint};
use fr_flow::FlowAdapter;
use fr_network::{PathResult, WeightedGraph};

use crate::PlanResult;

// ── CongestionLevel ───────────────────────────────────────────────────────────

/// Coarse bucket for the average flow on a leg.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Free,
    Light,
    Moderate,
    Heavy,
    Severe,
}

impl CongestionLevel {
    /// Bucket an average flow: ≤10 free, ≤30 light, ≤60 moderate,
    /// ≤100 heavy, otherwise severe.
    pub fn from_flow(avg_flow: f64) -> Self {
        match avg_flow {
            f if f <= 10.0 => CongestionLevel::Free,
            f if f <= 30.0 => CongestionLevel::Light,
            f if f <= 60.0 => CongestionLevel::Moderate,
            f if f <= 100.0 => CongestionLevel::Heavy,
            _ => CongestionLevel::Severe,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CongestionLevel::Free     => "free",
            CongestionLevel::Light    => "light",
            CongestionLevel::Moderate => "moderate",
            CongestionLevel::Heavy    => "heavy",
            CongestionLevel::Severe   => "severe",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── RouteReport ───────────────────────────────────────────────────────────────

/// One traversed edge.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub from:        SensorId,
    pub to:          SensorId,
    pub distance_km: f64,
    pub weight:      f64,
    pub avg_flow:    f64,
    pub level:       CongestionLevel,
}

/// A found route with its per-leg distances, weights, and flows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteReport {
    pub path:              Vec<SensorId>,
    pub legs:              Vec<RouteLeg>,
    pub total_distance_km: f64,
    pub total_cost:        f64,
    pub reference_time:    TimePoint,
    pub alpha:             f64,
}

impl RouteReport {
    /// Break `path` into legs using the weights it was searched over and
    /// the flows cached while scoring.
    pub(crate) fn build(
        weighted: &WeightedGraph<'_>,
        flows:    &FlowAdapter,
        time:     TimePoint,
        alpha:    f64,
        path:     &PathResult,
    ) -> PlanResult<Self> {
        let graph = weighted.graph();
        let mut legs = Vec::with_capacity(path.edges.len());

        for (hop, &edge) in path.edges.iter().enumerate() {
            let (from, to) = (path.path[hop], path.path[hop + 1]);
            let avg_flow = (flows.estimate(from, time)? + flows.estimate(to, time)?) / 2.0;
            legs.push(RouteLeg {
                from,
                to,
                distance_km: graph.edge_distance_km[edge.index()],
                weight: weighted.weight(edge),
                avg_flow,
                level: CongestionLevel::from_flow(avg_flow),
            });
        }

        Ok(Self {
            path: path.path.clone(),
            total_distance_km: legs.iter().map(|l| l.distance_km).sum(),
            total_cost: path.total_cost,
            legs,
            reference_time: time,
            alpha,
        })
    }

    /// The most congested leg, if the route has any legs.
    pub fn worst_leg(&self) -> Option<&RouteLeg> {
        self.legs.iter().max_by(|a, b| a.avg_flow.total_cmp(&b.avg_flow))
    }
}

impl fmt::Display for RouteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "route at {} (alpha {}): {} legs, {:.3} km, cost {:.3}",
            self.reference_time,
            self.alpha,
            self.legs.len(),
            self.total_distance_km,
            self.total_cost
        )?;
        for leg in &self.legs {
            writeln!(
                f,
                "  {:>8} → {:<8} {:>8.3} km  weight {:>9.3}  flow {:>8.2}  {}",
                leg.from, leg.to, leg.distance_km, leg.weight, leg.avg_flow, leg.level
            )?;
        }
        Ok(())
    }
}
