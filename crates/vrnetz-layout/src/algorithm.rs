//! Layout algorithm identifiers.
//!
//! Names are matched case-insensitively with `-` and `_` interchangeable.
//! Every name carrying the cartographs family marker (`cg_`, `cartograph`)
//! routes to the dimensionality-reduction branch, where the feature scope
//! (`local`, `global`, `importance`, `functional`) and the reduction method
//! (`tsne`, `umap`) are read from the rest of the name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Which per-node feature vectors feed a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureScope {
    /// Adjacency row plus self.
    Local,
    /// Random-walk-with-restart visiting probabilities.
    Global,
    /// Standardized centralities.
    Importance,
    /// Caller-supplied feature matrix.
    Functional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reduction {
    Tsne,
    Umap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    Spring,
    KamadaKawai,
    Random,
    Cartographs {
        scope: FeatureScope,
        reduction: Reduction,
    },
    /// Reserved.
    Topographic,
    /// Reserved.
    Geodesic,
}

impl FeatureScope {
    pub const ALL: [FeatureScope; 4] = [
        FeatureScope::Local,
        FeatureScope::Global,
        FeatureScope::Importance,
        FeatureScope::Functional,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FeatureScope::Local => "local",
            FeatureScope::Global => "global",
            FeatureScope::Importance => "importance",
            FeatureScope::Functional => "functional",
        }
    }
}

impl Reduction {
    pub const ALL: [Reduction; 2] = [Reduction::Tsne, Reduction::Umap];

    pub fn name(self) -> &'static str {
        match self {
            Reduction::Tsne => "tsne",
            Reduction::Umap => "umap",
        }
    }
}

impl Algorithm {
    /// Canonical name, e.g. `spring` or `cg_local_tsne`.
    pub fn name(&self) -> String {
        match self {
            Algorithm::Spring => "spring".into(),
            Algorithm::KamadaKawai => "kamada_kawai".into(),
            Algorithm::Random => "random".into(),
            Algorithm::Cartographs { scope, reduction } => {
                format!("cg_{}_{}", scope.name(), reduction.name())
            }
            Algorithm::Topographic => "cg_topographic".into(),
            Algorithm::Geodesic => "cg_geodesic".into(),
        }
    }

    /// Every algorithm the engine knows, reserved ones included.
    pub fn catalog() -> Vec<Algorithm> {
        let mut all = vec![Algorithm::Spring, Algorithm::KamadaKawai, Algorithm::Random];
        for scope in FeatureScope::ALL {
            for reduction in Reduction::ALL {
                all.push(Algorithm::Cartographs { scope, reduction });
            }
        }
        all.push(Algorithm::Topographic);
        all.push(Algorithm::Geodesic);
        all
    }

    pub fn is_implemented(&self) -> bool {
        !matches!(self, Algorithm::Topographic | Algorithm::Geodesic)
    }

    /// Needs a caller-supplied feature matrix.
    pub fn needs_features(&self) -> bool {
        matches!(
            self,
            Algorithm::Cartographs {
                scope: FeatureScope::Functional,
                ..
            }
        )
    }

    /// Isolated nodes are placed on the sampling sphere rather than embedded.
    pub fn splits_isolated(&self) -> bool {
        !matches!(self, Algorithm::Random)
    }

    pub fn parse(name: &str) -> Result<Self, LayoutError> {
        name.parse()
    }
}

fn is_cartographs(norm: &str) -> bool {
    norm.starts_with("cg") || norm.contains("cartograph")
}

fn exactly_one<T: Copy>(norm: &str, options: &[T], name: impl Fn(T) -> &'static str) -> Option<T> {
    let mut found = options.iter().copied().filter(|o| norm.contains(name(*o)));
    let first = found.next()?;
    found.next().is_none().then_some(first)
}

impl FromStr for Algorithm {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        match norm.as_str() {
            "spring" => return Ok(Algorithm::Spring),
            "kamada_kawai" | "kamadakawai" | "kk" => return Ok(Algorithm::KamadaKawai),
            "random" => return Ok(Algorithm::Random),
            _ => {}
        }

        let unknown = || LayoutError::UnknownAlgorithm(s.to_string());
        if !is_cartographs(&norm) {
            return Err(unknown());
        }
        if norm.contains("topographic") {
            return Ok(Algorithm::Topographic);
        }
        if norm.contains("geodesic") {
            return Ok(Algorithm::Geodesic);
        }

        let scope = exactly_one(&norm, &FeatureScope::ALL, FeatureScope::name).ok_or_else(unknown)?;
        let reduction = exactly_one(&norm, &Reduction::ALL, Reduction::name).ok_or_else(unknown)?;
        Ok(Algorithm::Cartographs { scope, reduction })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl TryFrom<String> for Algorithm {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Algorithm> for String {
    fn from(value: Algorithm) -> Self {
        value.name()
    }
}
