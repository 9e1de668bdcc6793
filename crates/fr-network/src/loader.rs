//! Node and edge record ingestion.
//!
//! # CSV format
//!
//! Nodes, one row per sensor (extra columns are ignored; `id` is accepted in
//! place of `sensor_id`):
//!
//! ```csv
//! sensor_id,latitude,longitude
//! 15,39.9496,116.3425
//! 18,39.9531,116.3390
//! ```
//!
//! Edges, one row per undirected road link:
//!
//! ```csv
//! from,to
//! 15,18
//! ```
//!
//! A row that fails to parse aborts the load.  Rows are never skipped: a
//! silently dropped sensor or link changes planning results.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use fr_core::SensorId;

use crate::NetworkError;

// ── Public records ────────────────────────────────────────────────────────────

/// A sensor location.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id:        SensorId,
    pub latitude:  f64,
    pub longitude: f64,
}

impl NodeRecord {
    pub fn new(id: u32, latitude: f64, longitude: f64) -> Self {
        Self { id: SensorId(id), latitude, longitude }
    }
}

/// An undirected link between two sensors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: SensorId,
    pub to:   SensorId,
}

impl EdgeRecord {
    pub fn new(from: u32, to: u32) -> Self {
        Self { from: SensorId(from), to: SensorId(to) }
    }
}

// ── CSV rows ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRow {
    #[serde(alias = "id")]
    sensor_id: u32,
    latitude:  f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct EdgeRow {
    from: u32,
    to:   u32,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load sensor records from a CSV file.
pub fn load_nodes_csv(path: &Path) -> Result<Vec<NodeRecord>, NetworkError> {
    let file = std::fs::File::open(path)?;
    load_nodes_reader(file)
}

/// Like [`load_nodes_csv`] but accepts any `Read` source.
pub fn load_nodes_reader<R: Read>(reader: R) -> Result<Vec<NodeRecord>, NetworkError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    csv_reader
        .deserialize::<NodeRow>()
        .map(|row| {
            let row = row.map_err(|e| NetworkError::Parse(format!("node record: {e}")))?;
            Ok(NodeRecord::new(row.sensor_id, row.latitude, row.longitude))
        })
        .collect()
}

/// Load edge records from a CSV file.
pub fn load_edges_csv(path: &Path) -> Result<Vec<EdgeRecord>, NetworkError> {
    let file = std::fs::File::open(path)?;
    load_edges_reader(file)
}

/// Like [`load_edges_csv`] but accepts any `Read` source.
pub fn load_edges_reader<R: Read>(reader: R) -> Result<Vec<EdgeRecord>, NetworkError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    csv_reader
        .deserialize::<EdgeRow>()
        .map(|row| {
            let row = row.map_err(|e| NetworkError::Parse(format!("edge record: {e}")))?;
            Ok(EdgeRecord::new(row.from, row.to))
        })
        .collect()
}
