//! Algorithm parameters.
//!
//! Requests carry parameters as a loose JSON object (values may be numbers or
//! numeric strings, unknown keys are ignored). They are validated once, into
//! the typed struct of the algorithm family, when a [`crate::LayoutSpec`] is
//! built.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vrnetz_network::table::cell_f64;

use crate::algorithm::{Algorithm, Reduction};
use crate::error::LayoutError;

/// Raw parameter map as received from a request.
pub type RawParams = serde_json::Map<String, Value>;

// ============================================================================
// Raw readers
// ============================================================================

fn read_f64(raw: &RawParams, keys: &[&str]) -> Result<Option<f64>, LayoutError> {
    let Some((key, value)) = keys.iter().find_map(|k| raw.get(*k).map(|v| (*k, v))) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    match cell_f64(value) {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(LayoutError::invalid(key, format!("`{value}` is not a number"))),
    }
}

fn read_count(raw: &RawParams, key: &str, default: usize) -> Result<usize, LayoutError> {
    match read_f64(raw, &[key])? {
        None => Ok(default),
        Some(v) if v < 0.0 => Err(LayoutError::invalid(key, "must not be negative")),
        Some(v) => Ok(v.trunc() as usize),
    }
}

fn positive(key: &str, value: f64) -> Result<f64, LayoutError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(LayoutError::invalid(key, "must be positive"))
    }
}

// ============================================================================
// Families
// ============================================================================

/// Force-directed (`spring`) parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    /// Optimal distance between nodes; `None` uses `1/sqrt(n)`.
    pub optimal_distance: Option<f64>,
    pub iterations: usize,
    /// Mean-displacement convergence threshold.
    pub threshold: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            optimal_distance: None,
            iterations: 50,
            threshold: 1e-4,
        }
    }
}

impl SpringParams {
    /// Reads `opt_dist` (alias `opt_dis`), `iterations` and `threshold`.
    /// A non-positive optimal distance means "unset".
    pub fn from_raw(raw: &RawParams) -> Result<Self, LayoutError> {
        let defaults = Self::default();
        let optimal_distance = read_f64(raw, &["opt_dist", "opt_dis"])?.filter(|d| *d > 0.0);
        let iterations = read_count(raw, "iterations", defaults.iterations)?;
        let threshold = read_f64(raw, &["threshold"])?.unwrap_or(defaults.threshold);
        if threshold < 0.0 {
            return Err(LayoutError::invalid("threshold", "must not be negative"));
        }
        Ok(Self {
            optimal_distance,
            iterations,
            threshold,
        })
    }
}

/// t-SNE parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TsneParams {
    pub perplexity: f64,
    /// Early exaggeration factor.
    pub density: f64,
    pub learning_rate: f64,
    pub steps: usize,
}

impl Default for TsneParams {
    fn default() -> Self {
        Self {
            perplexity: 0.5,
            density: 12.0,
            learning_rate: 200.0,
            steps: 250,
        }
    }
}

impl TsneParams {
    /// Reads `prplxty`, `density`, `l_rate` and `steps`.
    pub fn from_raw(raw: &RawParams) -> Result<Self, LayoutError> {
        let d = Self::default();
        let perplexity = read_f64(raw, &["prplxty", "perplexity"])?.unwrap_or(d.perplexity);
        let density = read_f64(raw, &["density"])?.unwrap_or(d.density);
        let learning_rate = read_f64(raw, &["l_rate", "learning_rate"])?.unwrap_or(d.learning_rate);
        let steps = read_count(raw, "steps", d.steps)?;
        if steps == 0 {
            return Err(LayoutError::invalid("steps", "must be at least 1"));
        }
        Ok(Self {
            perplexity: positive("prplxty", perplexity)?,
            density: positive("density", density)?,
            learning_rate: positive("l_rate", learning_rate)?,
            steps,
        })
    }
}

/// UMAP parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UmapParams {
    pub n_neighbors: usize,
    pub spread: f64,
    pub min_dist: f64,
}

impl Default for UmapParams {
    fn default() -> Self {
        Self {
            n_neighbors: 10,
            spread: 1.0,
            min_dist: 0.1,
        }
    }
}

impl UmapParams {
    /// Reads `n_neighbors`, `spread` and `min_dist`.
    pub fn from_raw(raw: &RawParams) -> Result<Self, LayoutError> {
        let d = Self::default();
        let n_neighbors = read_count(raw, "n_neighbors", d.n_neighbors)?;
        if n_neighbors < 2 {
            return Err(LayoutError::invalid("n_neighbors", "must be at least 2"));
        }
        let spread = positive("spread", read_f64(raw, &["spread"])?.unwrap_or(d.spread))?;
        let min_dist = read_f64(raw, &["min_dist"])?.unwrap_or(d.min_dist);
        if !(0.0..=spread).contains(&min_dist) {
            return Err(LayoutError::invalid("min_dist", "must lie in [0, spread]"));
        }
        Ok(Self {
            n_neighbors,
            spread,
            min_dist,
        })
    }
}

/// Validated parameters, one variant per algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum LayoutParams {
    Spring(SpringParams),
    Tsne(TsneParams),
    Umap(UmapParams),
    /// Algorithms without tunables (`kamada_kawai`, `random`, reserved).
    None,
}

impl LayoutParams {
    pub fn for_algorithm(algorithm: &Algorithm, raw: &RawParams) -> Result<Self, LayoutError> {
        Ok(match algorithm {
            Algorithm::Spring => LayoutParams::Spring(SpringParams::from_raw(raw)?),
            Algorithm::Cartographs {
                reduction: Reduction::Tsne,
                ..
            } => LayoutParams::Tsne(TsneParams::from_raw(raw)?),
            Algorithm::Cartographs {
                reduction: Reduction::Umap,
                ..
            } => LayoutParams::Umap(UmapParams::from_raw(raw)?),
            Algorithm::KamadaKawai
            | Algorithm::Random
            | Algorithm::Topographic
            | Algorithm::Geodesic => LayoutParams::None,
        })
    }

    pub fn defaults_for(algorithm: &Algorithm) -> Self {
        match algorithm {
            Algorithm::Spring => LayoutParams::Spring(SpringParams::default()),
            Algorithm::Cartographs {
                reduction: Reduction::Tsne,
                ..
            } => LayoutParams::Tsne(TsneParams::default()),
            Algorithm::Cartographs {
                reduction: Reduction::Umap,
                ..
            } => LayoutParams::Umap(UmapParams::default()),
            _ => LayoutParams::None,
        }
    }

    pub fn family(&self) -> &'static str {
        match self {
            LayoutParams::Spring(_) => "spring",
            LayoutParams::Tsne(_) => "tsne",
            LayoutParams::Umap(_) => "umap",
            LayoutParams::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawParams {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn spring_defaults() {
        let p = SpringParams::from_raw(&RawParams::new()).unwrap();
        assert_eq!(p, SpringParams::default());
        assert_eq!(p.iterations, 50);
        assert_eq!(p.threshold, 1e-4);
        assert_eq!(p.optimal_distance, None);
    }

    #[test]
    fn spring_reads_form_strings_and_alias() {
        let p = SpringParams::from_raw(&raw(json!({
            "opt_dis": "0.5", "iterations": "20", "threshold": 0.01
        })))
        .unwrap();
        assert_eq!(p.optimal_distance, Some(0.5));
        assert_eq!(p.iterations, 20);
        assert_eq!(p.threshold, 0.01);
    }

    #[test]
    fn non_positive_optimal_distance_is_unset() {
        let p = SpringParams::from_raw(&raw(json!({"opt_dist": 0}))).unwrap();
        assert_eq!(p.optimal_distance, None);
    }

    #[test]
    fn tsne_and_umap_defaults() {
        assert_eq!(
            TsneParams::default(),
            TsneParams {
                perplexity: 0.5,
                density: 12.0,
                learning_rate: 200.0,
                steps: 250
            }
        );
        assert_eq!(
            UmapParams::default(),
            UmapParams {
                n_neighbors: 10,
                spread: 1.0,
                min_dist: 0.1
            }
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let p = TsneParams::from_raw(&raw(json!({"colour": "blue"}))).unwrap();
        assert_eq!(p, TsneParams::default());
    }

    #[test]
    fn bad_values_are_invalid_parameters() {
        let err = SpringParams::from_raw(&raw(json!({"iterations": "many"}))).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::InvalidParameter { ref name, .. } if name == "iterations"
        ));

        let err = UmapParams::from_raw(&raw(json!({"min_dist": 5.0}))).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::InvalidParameter { ref name, .. } if name == "min_dist"
        ));

        let err = TsneParams::from_raw(&raw(json!({"l_rate": -1}))).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidParameter { .. }));
    }

    #[test]
    fn family_follows_algorithm() {
        let cg: Algorithm = "cg_importance_umap".parse().unwrap();
        let p = LayoutParams::for_algorithm(&cg, &RawParams::new()).unwrap();
        assert_eq!(p.family(), "umap");
        assert_eq!(
            LayoutParams::for_algorithm(&Algorithm::KamadaKawai, &RawParams::new()).unwrap(),
            LayoutParams::None
        );
    }
}
