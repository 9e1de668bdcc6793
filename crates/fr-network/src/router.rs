//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The planner calls routing through the [`Router`] trait, so callers can
//! swap in another label-setting search without touching the facade.
//!
//! # Determinism
//!
//! Among paths whose total weights are exactly equal, [`DijkstraRouter`]
//! prefers:
//!
//! 1. the path with fewer edges, then
//! 2. the lexicographically smallest sequence of sensor ids.
//!
//! Both rules are applied during relaxation, so the result does not depend
//! on adjacency or heap order.  Labels are ordered by `(cost, hops)` with
//! exact float comparison, the same key the heap pops by, so a node is
//! never settled ahead of a label that would beat it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use fr_core::{EdgeId, NodeId, SensorId};

use crate::network::WeightedGraph;
use crate::NetworkResult;

// ── PathResult ────────────────────────────────────────────────────────────────

/// A minimum-weight path: the sensors visited in order and the summed edge
/// weight.
///
/// Serializes as `{"path": [15, 18, 20], "totalCost": 42.37}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    /// Sensors from source to target inclusive.  Length 1 when source ==
    /// target.
    pub path: Vec<SensorId>,
    /// Sum of traversed edge weights.
    pub total_cost: f64,
    /// Edges traversed, parallel to consecutive pairs of `path`.
    #[serde(skip)]
    pub edges: Vec<EdgeId>,
}

impl PathResult {
    /// `true` if the source and target are the same sensor.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn hop_count(&self) -> usize {
        self.edges.len()
    }

    pub fn source(&self) -> Option<SensorId> {
        self.path.first().copied()
    }

    pub fn target(&self) -> Option<SensorId> {
        self.path.last().copied()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// Implementations must be `Send + Sync` so one router can serve several
/// planning runs on different threads.
pub trait Router: Send + Sync {
    /// Compute the minimum-weight path from `from` to `to`.
    ///
    /// Returns `Ok(None)` if `to` is unreachable; that is a normal outcome.
    /// Returns `Err(UnknownSensor)` if either id is not in the graph.
    fn shortest_path(
        &self,
        graph: &WeightedGraph<'_>,
        from:  SensorId,
        to:    SensorId,
    ) -> NetworkResult<Option<PathResult>>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm with deterministic tie-breaking.
///
/// Correct for the finite, non-negative weights that [`WeightedGraph`]
/// guarantees.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn shortest_path(
        &self,
        graph: &WeightedGraph<'_>,
        from:  SensorId,
        to:    SensorId,
    ) -> NetworkResult<Option<PathResult>> {
        let source = graph.graph().require_node(from)?;
        let target = graph.graph().require_node(to)?;
        Ok(dijkstra(graph, source, target))
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Per-node search state.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SearchState {
    /// Not yet reached.
    Unvisited,
    /// In the priority queue with a tentative label.
    Frontier,
    /// Label is final and never updated again.
    Settled,
}

/// Best known way to reach a node.
#[derive(Copy, Clone)]
struct Label {
    cost:      f64,
    hops:      u32,
    prev:      NodeId,
    prev_edge: EdgeId,
}

impl Label {
    const UNREACHED: Label = Label {
        cost:      f64::INFINITY,
        hops:      u32::MAX,
        prev:      NodeId::INVALID,
        prev_edge: EdgeId::INVALID,
    };
}

/// Heap entry.  `BinaryHeap` is a max-heap, so `Ord` is reversed to pop the
/// smallest `(cost, hops, node)` first.
#[derive(Copy, Clone, PartialEq)]
struct Entry {
    cost: f64,
    hops: u32,
    node: NodeId,
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.hops.cmp(&self.hops))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Node sequence from the source to `node`, following `prev` links.
fn trace(labels: &[Label], node: NodeId) -> Vec<NodeId> {
    let mut seq = vec![node];
    let mut cur = node;
    while labels[cur.index()].prev != NodeId::INVALID {
        cur = labels[cur.index()].prev;
        seq.push(cur);
    }
    seq.reverse();
    seq
}

/// `true` if reaching `v` via `candidate` beats its current label.
fn improves(labels: &[Label], candidate: &Label, current: &Label) -> bool {
    match candidate.cost.total_cmp(&current.cost) {
        Ordering::Less    => true,
        Ordering::Greater => false,
        Ordering::Equal   => match candidate.hops.cmp(&current.hops) {
            Ordering::Less    => true,
            Ordering::Greater => false,
            // Same length: both predecessors are settled, so their paths are
            // final and can be compared element by element.
            Ordering::Equal   => trace(labels, candidate.prev) < trace(labels, current.prev),
        },
    }
}

fn dijkstra(graph: &WeightedGraph<'_>, source: NodeId, target: NodeId) -> Option<PathResult> {
    let net = graph.graph();

    if source == target {
        return Some(PathResult {
            path:       vec![net.sensor_of(source)],
            total_cost: 0.0,
            edges:      vec![],
        });
    }

    let n = net.node_count();
    let mut state  = vec![SearchState::Unvisited; n];
    let mut labels = vec![Label::UNREACHED; n];

    labels[source.index()] = Label { cost: 0.0, hops: 0, prev: NodeId::INVALID, prev_edge: EdgeId::INVALID };
    state[source.index()] = SearchState::Frontier;

    let mut heap = BinaryHeap::new();
    heap.push(Entry { cost: 0.0, hops: 0, node: source });
    let mut settled = 0usize;

    while let Some(Entry { node: u, .. }) = heap.pop() {
        // Skip stale heap entries.
        if state[u.index()] == SearchState::Settled {
            continue;
        }
        state[u.index()] = SearchState::Settled;
        settled += 1;

        if u == target {
            log::debug!("dijkstra: target reached after settling {settled} of {n} nodes");
            return Some(reconstruct(graph, &labels, target));
        }

        let lu = labels[u.index()];
        for (v, edge) in net.neighbors(u) {
            if state[v.index()] == SearchState::Settled {
                continue;
            }
            let candidate = Label {
                cost:      lu.cost + graph.weight(edge),
                hops:      lu.hops + 1,
                prev:      u,
                prev_edge: edge,
            };
            let better = match state[v.index()] {
                SearchState::Unvisited => true,
                _ => improves(&labels, &candidate, &labels[v.index()]),
            };
            if better {
                labels[v.index()] = candidate;
                state[v.index()] = SearchState::Frontier;
                heap.push(Entry { cost: candidate.cost, hops: candidate.hops, node: v });
            }
        }
    }

    log::debug!("dijkstra: frontier exhausted after settling {settled} of {n} nodes");
    None
}

fn reconstruct(graph: &WeightedGraph<'_>, labels: &[Label], target: NodeId) -> PathResult {
    let net = graph.graph();
    let nodes = trace(labels, target);
    let edges: Vec<EdgeId> = nodes[1..]
        .iter()
        .map(|v| labels[v.index()].prev_edge)
        .collect();
    PathResult {
        path:       nodes.iter().map(|&v| net.sensor_of(v)).collect(),
        total_cost: labels[target.index()].cost,
        edges,
    }
}
