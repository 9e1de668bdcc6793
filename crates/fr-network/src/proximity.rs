//! Threshold-based edge generation.
//!
//! When no explicit road links are available, sensors closer than a fixed
//! great-circle distance can be connected directly.  Candidates come from an
//! R-tree envelope query in degree space; the haversine check then keeps only
//! pairs that are really within range.

use rstar::{RTree, AABB};
use rstar::primitives::GeomWithData;

use fr_core::{EARTH_RADIUS_KM, GeoPoint};

use crate::loader::{EdgeRecord, NodeRecord};

/// Kilometres per degree of latitude.
const KM_PER_DEG: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

type Entry = GeomWithData<[f64; 2], usize>;

/// Propose an undirected edge for every pair of nodes within `max_km`.
///
/// The result is sorted, oriented `from < to`, and duplicate-free, so it can
/// be passed straight to the graph builder.  Nodes with invalid coordinates
/// are skipped (the builder reports them).  A non-positive or non-finite
/// `max_km` yields no edges.
pub fn proximity_edges(nodes: &[NodeRecord], max_km: f64) -> Vec<EdgeRecord> {
    if !(max_km.is_finite() && max_km > 0.0) {
        return Vec::new();
    }

    let entries: Vec<Entry> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| GeoPoint::new(n.latitude, n.longitude).is_valid())
        .map(|(i, n)| GeomWithData::new([n.latitude, n.longitude], i))
        .collect();
    let tree = RTree::bulk_load(entries);

    let d_lat = max_km / KM_PER_DEG;
    let mut edges = Vec::new();

    for entry in tree.iter() {
        let a = &nodes[entry.data];
        let pa = GeoPoint::new(a.latitude, a.longitude);

        // Longitude degrees shrink with latitude; size the box for the
        // highest latitude it can reach.
        let lat_hi = (pa.lat.abs() + d_lat).min(90.0);
        let cos_hi = lat_hi.to_radians().cos();
        let d_lon = if cos_hi > 1e-9 { (max_km / (KM_PER_DEG * cos_hi)).min(360.0) } else { 360.0 };

        let envelope = AABB::from_corners(
            [pa.lat - d_lat, pa.lon - d_lon],
            [pa.lat + d_lat, pa.lon + d_lon],
        );
        for other in tree.locate_in_envelope(&envelope) {
            let b = &nodes[other.data];
            if b.id <= a.id {
                continue;
            }
            let pb = GeoPoint::new(b.latitude, b.longitude);
            if pa.distance_km(pb) <= max_km {
                edges.push(EdgeRecord { from: a.id, to: b.id });
            }
        }
    }

    edges.sort_unstable();
    edges.dedup();
    log::debug!("proximity_edges: {} edges within {max_km} km", edges.len());
    edges
}
