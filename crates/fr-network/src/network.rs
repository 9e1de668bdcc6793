//! Sensor graph representation and builder.
//!
//! # Data layout
//!
//! Nodes are stored in ascending [`SensorId`] order, so `NodeId` order and
//! `SensorId` order agree.  The router relies on this for its lexicographic
//! tie-break.
//!
//! Each undirected edge is stored once (indexed by `EdgeId`, in input
//! order) together with its haversine length.  Traversal uses a
//! **Compressed Sparse Row (CSR)** adjacency holding two arcs per edge:
//!
//! ```text
//! adj_to  [ node_adj_start[n] .. node_adj_start[n+1] ]   neighbour NodeIds
//! adj_edge[ node_adj_start[n] .. node_adj_start[n+1] ]   undirected EdgeIds
//! ```
//!
//! Arcs of a node are sorted by neighbour, so iteration order is
//! deterministic regardless of input order.
//!
//! # Weights
//!
//! `SensorGraph` is immutable after `build()`.  Congestion weights live in a
//! separate [`WeightedGraph`], created once per planning run and read-only
//! during search.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use fr_core::{EdgeId, GeoPoint, NodeId, SensorId};

use crate::loader::{EdgeRecord, NodeRecord};
use crate::{NetworkError, NetworkResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Good enough for
    /// nearest-sensor snapping within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── SensorGraph ───────────────────────────────────────────────────────────────

/// Undirected sensor graph in CSR format plus a spatial index.
///
/// Do not construct directly; use [`SensorGraphBuilder`] or
/// [`SensorGraph::from_records`].
pub struct SensorGraph {
    // ── Node data (indexed by NodeId) ─────────────────────────────────────
    /// External id of each node, strictly ascending.
    pub sensor_ids: Vec<SensorId>,

    /// Geographic position of each node.
    pub node_pos: Vec<GeoPoint>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    /// Endpoints of each undirected edge, in input orientation.
    pub edge_ends: Vec<(NodeId, NodeId)>,

    /// Great-circle length of each edge in kilometres, computed once at
    /// build time.
    pub edge_distance_km: Vec<f64>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// Row pointer.  Length = `node_count + 1`.
    pub node_adj_start: Vec<u32>,

    /// Neighbour at the far end of each arc.
    pub adj_to: Vec<NodeId>,

    /// Undirected edge each arc belongs to.
    pub adj_edge: Vec<EdgeId>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl SensorGraph {
    /// Validate `nodes` and `edges` and build the graph in one step.
    pub fn from_records(nodes: &[NodeRecord], edges: &[EdgeRecord]) -> NetworkResult<Self> {
        let mut b = SensorGraphBuilder::with_capacity(nodes.len(), edges.len());
        for n in nodes {
            b.add_sensor(n.id, GeoPoint::new(n.latitude, n.longitude));
        }
        for e in edges {
            b.add_edge(e.from, e.to);
        }
        b.build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.sensor_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensor_ids.is_empty()
    }

    // ── Id translation ────────────────────────────────────────────────────

    /// Dense index of `sensor`, or `None` if it is not in the graph.
    pub fn node_of(&self, sensor: SensorId) -> Option<NodeId> {
        self.sensor_ids
            .binary_search(&sensor)
            .ok()
            .map(|i| NodeId(i as u32))
    }

    /// Like [`node_of`](Self::node_of) but returns `UnknownSensor` on a miss.
    pub fn require_node(&self, sensor: SensorId) -> NetworkResult<NodeId> {
        self.node_of(sensor).ok_or(NetworkError::UnknownSensor(sensor))
    }

    #[inline]
    pub fn sensor_of(&self, node: NodeId) -> SensorId {
        self.sensor_ids[node.index()]
    }

    pub fn contains(&self, sensor: SensorId) -> bool {
        self.node_of(sensor).is_some()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// `(neighbour, edge)` pairs incident to `node`, ascending by neighbour.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, EdgeId)> + '_ {
        let start = self.node_adj_start[node.index()] as usize;
        let end   = self.node_adj_start[node.index() + 1] as usize;
        (start..end).map(move |i| (self.adj_to[i], self.adj_edge[i]))
    }

    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        let start = self.node_adj_start[node.index()] as usize;
        let end   = self.node_adj_start[node.index() + 1] as usize;
        end - start
    }

    /// The edge joining `a` and `b`, in either orientation.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.neighbors(a).find(|&(n, _)| n == b).map(|(_, e)| e)
    }

    /// Both endpoint sensors of `edge`, in input orientation.
    #[inline]
    pub fn edge_sensors(&self, edge: EdgeId) -> (SensorId, SensorId) {
        let (a, b) = self.edge_ends[edge.index()];
        (self.sensor_of(a), self.sensor_of(b))
    }

    /// Every sensor that is an endpoint of at least one edge, ascending.
    pub fn incident_sensors(&self) -> Vec<SensorId> {
        (0..self.node_count())
            .map(|i| NodeId(i as u32))
            .filter(|&n| self.degree(n) > 0)
            .map(|n| self.sensor_of(n))
            .collect()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the sensor nearest to `pos`.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn nearest_sensor(&self, pos: GeoPoint) -> Option<SensorId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| self.sensor_of(e.id))
    }
}

// ── SensorGraphBuilder ────────────────────────────────────────────────────────

/// Collect sensors and undirected edges, then call [`build`](Self::build).
///
/// Sensors and edges may be added in any order.  All validation happens in
/// `build()`, which fails on the first problem found:
///
/// - coordinate outside latitude [-90, 90] / longitude [-180, 180]
/// - sensor id listed twice
/// - edge endpoint not in the sensor set
/// - self-loop
/// - the same unordered pair listed twice
///
/// # Example
///
/// ```
/// use fr_core::{GeoPoint, SensorId};
/// use fr_network::SensorGraphBuilder;
///
/// let mut b = SensorGraphBuilder::new();
/// b.add_sensor(SensorId(15), GeoPoint::new(39.950, 116.340));
/// b.add_sensor(SensorId(18), GeoPoint::new(39.955, 116.345));
/// b.add_edge(SensorId(15), SensorId(18));
/// let g = b.build().unwrap();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 1);
/// ```
pub struct SensorGraphBuilder {
    sensors:   Vec<(SensorId, GeoPoint)>,
    raw_edges: Vec<(SensorId, SensorId)>,
}

impl SensorGraphBuilder {
    pub fn new() -> Self {
        Self { sensors: Vec::new(), raw_edges: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            sensors:   Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    pub fn add_sensor(&mut self, id: SensorId, pos: GeoPoint) -> &mut Self {
        self.sensors.push((id, pos));
        self
    }

    /// Add an **undirected** edge between `a` and `b`.
    pub fn add_edge(&mut self, a: SensorId, b: SensorId) -> &mut Self {
        self.raw_edges.push((a, b));
        self
    }

    pub fn node_count(&self) -> usize { self.sensors.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Validate and produce a [`SensorGraph`].
    ///
    /// Time complexity: O(N log N + E log E).
    pub fn build(self) -> NetworkResult<SensorGraph> {
        // ── Nodes: validate, sort, reject duplicates ──────────────────────
        let mut sensors = self.sensors;
        for &(id, pos) in &sensors {
            if !pos.is_valid() {
                return Err(NetworkError::InvalidCoordinate { sensor: id, lat: pos.lat, lon: pos.lon });
            }
        }
        sensors.sort_by_key(|&(id, _)| id);
        if let Some(w) = sensors.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(NetworkError::DuplicateSensor(w[0].0));
        }

        let sensor_ids: Vec<SensorId> = sensors.iter().map(|&(id, _)| id).collect();
        let node_pos:   Vec<GeoPoint> = sensors.iter().map(|&(_, p)| p).collect();
        let node_count = sensor_ids.len();

        let lookup = |id: SensorId| sensor_ids.binary_search(&id).ok().map(|i| NodeId(i as u32));

        // ── Edges: resolve endpoints, reject loops and duplicates ─────────
        let mut edge_ends = Vec::with_capacity(self.raw_edges.len());
        for &(from, to) in &self.raw_edges {
            let a = lookup(from)
                .ok_or(NetworkError::UnknownEndpoint { from, to, missing: from })?;
            let b = lookup(to)
                .ok_or(NetworkError::UnknownEndpoint { from, to, missing: to })?;
            if a == b {
                return Err(NetworkError::SelfLoop(from));
            }
            edge_ends.push((a, b));
        }

        let mut pairs: Vec<(NodeId, NodeId)> = edge_ends
            .iter()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();
        pairs.sort_unstable();
        if let Some(w) = pairs.windows(2).find(|w| w[0] == w[1]) {
            let (a, b) = w[0];
            return Err(NetworkError::DuplicateEdge {
                a: sensor_ids[a.index()],
                b: sensor_ids[b.index()],
            });
        }

        let edge_distance_km: Vec<f64> = edge_ends
            .iter()
            .map(|&(a, b)| node_pos[a.index()].distance_km(node_pos[b.index()]))
            .collect();

        // ── CSR adjacency: two arcs per edge, sorted by (source, target) ──
        let mut arcs: Vec<(NodeId, NodeId, EdgeId)> = Vec::with_capacity(edge_ends.len() * 2);
        for (i, &(a, b)) in edge_ends.iter().enumerate() {
            let e = EdgeId(i as u32);
            arcs.push((a, b, e));
            arcs.push((b, a, e));
        }
        arcs.sort_unstable_by_key(|&(from, to, _)| (from, to));

        let mut node_adj_start = vec![0u32; node_count + 1];
        for &(from, _, _) in &arcs {
            node_adj_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_adj_start[i] += node_adj_start[i - 1];
        }
        debug_assert_eq!(node_adj_start[node_count] as usize, arcs.len());

        let adj_to:   Vec<NodeId> = arcs.iter().map(|&(_, to, _)| to).collect();
        let adj_edge: Vec<EdgeId> = arcs.iter().map(|&(_, _, e)| e).collect();

        // Bulk-load R-tree for O(N log N) construction.
        let entries: Vec<NodeEntry> = node_pos
            .iter()
            .enumerate()
            .map(|(i, pos)| NodeEntry { point: [pos.lat, pos.lon], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        log::debug!(
            "built sensor graph: {} nodes, {} edges",
            node_count,
            edge_ends.len()
        );

        Ok(SensorGraph {
            sensor_ids,
            node_pos,
            edge_ends,
            edge_distance_km,
            node_adj_start,
            adj_to,
            adj_edge,
            spatial_idx,
        })
    }
}

impl Default for SensorGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── WeightedGraph ─────────────────────────────────────────────────────────────

/// A [`SensorGraph`] paired with one finalized weight per edge.
///
/// Weights are validated on construction (finite, ≥ 0) and cannot be
/// changed afterwards, so the search always sees a stable graph.
pub struct WeightedGraph<'g> {
    graph:   &'g SensorGraph,
    weights: Vec<f64>,
}

impl<'g> WeightedGraph<'g> {
    /// Attach `weights` (indexed by `EdgeId`) to `graph`.
    pub fn new(graph: &'g SensorGraph, weights: Vec<f64>) -> NetworkResult<Self> {
        if weights.len() != graph.edge_count() {
            return Err(NetworkError::WeightCountMismatch {
                expected: graph.edge_count(),
                got:      weights.len(),
            });
        }
        if let Some((edge, &weight)) = weights
            .iter()
            .enumerate()
            .find(|&(_, w)| !w.is_finite() || *w < 0.0)
        {
            return Err(NetworkError::InvalidWeight { edge, weight });
        }
        Ok(Self { graph, weights })
    }

    /// Weight every edge by its physical length only.
    pub fn by_distance(graph: &'g SensorGraph) -> Self {
        Self { graph, weights: graph.edge_distance_km.clone() }
    }

    #[inline]
    pub fn graph(&self) -> &'g SensorGraph {
        self.graph
    }

    #[inline]
    pub fn weight(&self, edge: EdgeId) -> f64 {
        self.weights[edge.index()]
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}
