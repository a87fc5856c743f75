//! VRNetz network model
//!
//! A VRNetz document is three named sections:
//! - `nodes`: one row per node, arbitrary attribute columns, keyed by `id`
//! - `links`: one row per edge, keyed by start (`s`) and end (`e`) node ids
//! - `network`: free-form metadata (`database` marks STRING/STITCH exports)
//!
//! This crate owns the tabular model, the [`Graph`] view derived from it, and
//! the loaders that produce a [`Network`] (VRNetz JSON, GraphML) plus the
//! per-node [`FeatureMatrix`] consumed by functional embeddings.

pub mod error;
pub mod features;
pub mod graph;
pub mod graphml;
pub mod network;
pub mod table;

pub use error::NetworkError;
pub use features::FeatureMatrix;
pub use graph::{Graph, GraphNode, Partition, Subgraph};
pub use network::Network;
pub use table::{id_key, Row};

/// Node id column.
pub const NODE_ID: &str = "id";
/// Link start column.
pub const LINK_START: &str = "s";
/// Link end column.
pub const LINK_END: &str = "e";

/// Top-level section names of a VRNetz document.
pub mod sections {
    pub const NODES: &str = "nodes";
    pub const LINKS: &str = "links";
    pub const NETWORK: &str = "network";
}
