//! Layout dispatch.
//!
//! A [`LayoutSpec`] names one layout and fixes its algorithm and validated
//! parameters. [`compute`] turns a graph into positions for every node:
//! - the graph is split into an embedded set and a sphere set (isolated
//!   nodes, or feature-less nodes for functional layouts)
//! - the embedded set goes through the algorithm on its own subgraph
//! - the sphere set is spread over a sphere around the embedded centroid
//!
//! Raw algorithm output is returned; callers normalize.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use vrnetz_network::{FeatureMatrix, Graph, Subgraph};

use crate::algorithm::{Algorithm, FeatureScope, Reduction};
use crate::algorithms::distance::{pairwise, Metric};
use crate::algorithms::{features, kamada_kawai, random_layout, spring, tsne, umap};
use crate::error::LayoutError;
use crate::normalize::normalize_in_place;
use crate::params::{LayoutParams, RawParams};
use crate::point::{Point3, Positions};
use crate::sphere::{SphereConfig, SphereSampler};

/// One named layout request, validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    pub name: String,
    pub algorithm: Algorithm,
    pub params: LayoutParams,
    /// Replace the algorithm by uniform random positions.
    #[serde(default)]
    pub random: bool,
}

impl LayoutSpec {
    /// Validate `raw` against the parameter family of `algorithm`.
    /// Reserved algorithms are rejected here, before any work is done.
    pub fn new(
        name: impl Into<String>,
        algorithm: Algorithm,
        raw: &RawParams,
    ) -> Result<Self, LayoutError> {
        if !algorithm.is_implemented() {
            return Err(LayoutError::NotImplemented(algorithm.name()));
        }
        Ok(Self {
            name: name.into(),
            params: LayoutParams::for_algorithm(&algorithm, raw)?,
            algorithm,
            random: false,
        })
    }

    /// Parse the algorithm name, then [`LayoutSpec::new`].
    pub fn parse(
        name: impl Into<String>,
        algorithm: &str,
        raw: &RawParams,
    ) -> Result<Self, LayoutError> {
        Self::new(name, algorithm.parse()?, raw)
    }

    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }
}

/// Run-wide knobs shared by every layout of a request.
#[derive(Debug, Clone, Copy)]
pub struct ComputeOptions<'a> {
    pub dimension: usize,
    pub seed: u64,
    /// Force uniform random positions for every layout.
    pub random: bool,
    pub sphere: SphereConfig,
    pub features: Option<&'a FeatureMatrix>,
}

impl Default for ComputeOptions<'_> {
    fn default() -> Self {
        Self {
            dimension: 3,
            seed: 42,
            random: false,
            sphere: SphereConfig::default(),
            features: None,
        }
    }
}

impl<'a> ComputeOptions<'a> {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_features(mut self, features: Option<&'a FeatureMatrix>) -> Self {
        self.features = features;
        self
    }
}

/// A named layout and, once computed, its positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub spec: LayoutSpec,
    pub positions: Positions,
}

impl Layout {
    pub fn new(spec: LayoutSpec) -> Self {
        Self {
            spec,
            positions: Positions::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn is_computed(&self) -> bool {
        !self.positions.is_empty()
    }

    /// Compute raw positions for `graph`.
    pub fn calculate(
        &mut self,
        graph: &Graph,
        options: &ComputeOptions<'_>,
    ) -> Result<(), LayoutError> {
        self.positions = compute(graph, &self.spec, options)?;
        Ok(())
    }

    /// Min-max normalize the first `dim` axes of the positions.
    pub fn normalize(&mut self, dim: usize) {
        normalize_in_place(&mut self.positions, dim);
    }
}

// ============================================================================
// Dispatch
// ============================================================================

fn check_dimension(dim: usize) -> Result<(), LayoutError> {
    if (2..=3).contains(&dim) {
        Ok(())
    } else {
        Err(LayoutError::InvalidDimension(dim))
    }
}

fn mismatch(spec: &LayoutSpec) -> LayoutError {
    LayoutError::ParameterMismatch {
        algorithm: spec.algorithm.name(),
        params: spec.params.family(),
    }
}

/// Split graph indices into (embedded, sphere-sampled).
fn split_nodes(
    graph: &Graph,
    algorithm: &Algorithm,
    features: Option<&FeatureMatrix>,
) -> Result<(Vec<usize>, Vec<usize>), LayoutError> {
    if algorithm.needs_features() {
        let fm = features.ok_or_else(|| LayoutError::MissingFeatureMatrix(algorithm.name()))?;
        return Ok((0..graph.node_count()).partition(|&i| fm.has_features(&graph.nodes()[i].id)));
    }
    if !algorithm.splits_isolated() {
        return Ok(((0..graph.node_count()).collect(), Vec::new()));
    }
    let partition = graph.partition();
    Ok((partition.linked, partition.isolated))
}

fn feature_rows(
    sub: &Subgraph,
    scope: FeatureScope,
    features: Option<&FeatureMatrix>,
) -> Vec<Vec<f64>> {
    match scope {
        FeatureScope::Local => features::local_features(sub),
        FeatureScope::Global => features::global_features(sub),
        FeatureScope::Importance => features::importance_features(sub),
        FeatureScope::Functional => sub
            .ids()
            .iter()
            .map(|id| {
                features
                    .and_then(|fm| fm.get(id))
                    .map(<[f64]>::to_vec)
                    .unwrap_or_default()
            })
            .collect(),
    }
}

fn metric_for(scope: FeatureScope) -> Metric {
    match scope {
        FeatureScope::Importance => Metric::Euclidean,
        _ => Metric::Cosine,
    }
}

fn embed(
    sub: &Subgraph,
    spec: &LayoutSpec,
    features: Option<&FeatureMatrix>,
    dim: usize,
    rng: &mut StdRng,
) -> Result<Vec<Point3>, LayoutError> {
    match (&spec.algorithm, &spec.params) {
        (Algorithm::Spring, LayoutParams::Spring(p)) => Ok(spring::spring_layout(sub, p, dim, rng)),
        (Algorithm::Spring, _) => Err(mismatch(spec)),
        (Algorithm::KamadaKawai, _) => Ok(kamada_kawai::kamada_kawai_layout(sub, dim, rng)),
        (Algorithm::Random, _) => Ok(random_layout(sub.len(), dim, rng)),
        (Algorithm::Cartographs { scope, reduction }, params) => {
            let rows = feature_rows(sub, *scope, features);
            let distances = pairwise(&rows, metric_for(*scope));
            match (reduction, params) {
                (Reduction::Tsne, LayoutParams::Tsne(p)) => Ok(tsne::tsne(&distances, p, dim, rng)),
                (Reduction::Umap, LayoutParams::Umap(p)) => Ok(umap::umap(&distances, p, dim, rng)),
                _ => Err(mismatch(spec)),
            }
        }
        (Algorithm::Topographic | Algorithm::Geodesic, _) => {
            Err(LayoutError::NotImplemented(spec.algorithm.name()))
        }
    }
}

/// Positions for every node of `graph` under `spec`.
///
/// Same graph, spec and options always give the same positions.
pub fn compute(
    graph: &Graph,
    spec: &LayoutSpec,
    options: &ComputeOptions<'_>,
) -> Result<Positions, LayoutError> {
    let dim = options.dimension;
    check_dimension(dim)?;
    if !spec.algorithm.is_implemented() {
        return Err(LayoutError::NotImplemented(spec.algorithm.name()));
    }

    let started = Instant::now();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let (embedded, sphere_set) = split_nodes(graph, &spec.algorithm, options.features)?;
    let sub = graph.subgraph(&embedded);

    let local = if spec.random || options.random {
        random_layout(sub.len(), dim, &mut rng)
    } else {
        embed(&sub, spec, options.features, dim, &mut rng)?
    };

    let sampled = SphereSampler::new(&options.sphere).sample(sphere_set.len(), &local, &mut rng);
    let sampled = if dim == 2 {
        sampled.into_iter().map(Point3::flatten).collect()
    } else {
        sampled
    };

    let mut positions = Positions::new();
    positions.extend(sub.ids().iter().cloned().zip(local));
    positions.extend(
        sphere_set
            .iter()
            .map(|&i| graph.nodes()[i].id.clone())
            .zip(sampled),
    );

    tracing::info!(
        layout = %spec.name,
        algorithm = %spec.algorithm,
        embedded = sub.len(),
        sphere = sphere_set.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "computed layout"
    );
    Ok(positions)
}
