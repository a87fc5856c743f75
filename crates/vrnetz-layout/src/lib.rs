//! VRNetz layout engine
//!
//! Computes 2D/3D node positions for a [`vrnetz_network::Graph`]:
//! - `spring`: Fruchterman–Reingold force-directed placement
//! - `kamada_kawai`: stress majorization over hop distances
//! - `cg_<scope>_<tsne|umap>`: structural or functional feature vectors
//!   reduced by t-SNE or UMAP
//! - `random`: uniform placement
//!
//! Nodes an algorithm cannot embed (isolated nodes, feature-less nodes) are
//! spread over a sphere around the embedded ones, and positions can be
//! min-max normalized into the unit cube.

pub mod algorithm;
pub mod algorithms;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod params;
pub mod point;
pub mod sphere;

pub use algorithm::{Algorithm, FeatureScope, Reduction};
pub use engine::{compute, ComputeOptions, Layout, LayoutSpec};
pub use error::LayoutError;
pub use normalize::{normalize_in_place, normalize_positions};
pub use params::{LayoutParams, RawParams, SpringParams, TsneParams, UmapParams};
pub use point::{centroid, Point3, Positions};
pub use sphere::{SphereConfig, SphereSampler};
