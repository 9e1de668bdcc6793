//! `fr-network` — sensor graph, record ingestion, and routing.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`network`]   | `SensorGraph` (CSR + R-tree), `SensorGraphBuilder`, `WeightedGraph` |
//! | [`loader`]    | `NodeRecord`, `EdgeRecord`, CSV loaders                   |
//! | [`proximity`] | `proximity_edges` — threshold-based edge generation       |
//! | [`router`]    | `Router` trait, `PathResult`, `DijkstraRouter`            |
//! | [`error`]     | `NetworkError`, `NetworkResult<T>`                        |
//!
//! # Graph model
//!
//! The graph is undirected: every input edge `(a, b)` can be traversed in
//! both directions at the same weight.  Self-loops and duplicate pairs are
//! rejected at build time.  Disconnected components are fine; a query
//! between them yields `Ok(None)` from the router.

pub mod error;
pub mod loader;
pub mod network;
pub mod proximity;
pub mod router;


pub use error::{NetworkError, NetworkResult};
pub use loader::{EdgeRecord, NodeRecord, load_edges_csv, load_edges_reader, load_nodes_csv, load_nodes_reader};
pub use network::{SensorGraph, SensorGraphBuilder, WeightedGraph};
pub use proximity::proximity_edges;
pub use router::{DijkstraRouter, PathResult, Router, SearchState};
