//! Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vrnetz_layout::{ComputeOptions, SphereConfig};
use vrnetz_network::FeatureMatrix;

use crate::error::ProjectError;
use crate::links::DEFAULT_LINK_COLOR;

/// Run-wide settings. Every field has a default, so a partial JSON object
/// (or `{}`) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base RNG seed; layout `i` of a request is seeded with `seed + i`.
    pub seed: u64,
    /// 2 or 3.
    pub dimension: usize,
    /// Compute the layouts of one request concurrently.
    pub parallel: bool,
    /// Replace every algorithm by uniform random positions.
    pub random_fallback: bool,
    pub sphere: SphereConfig,
    pub link_color: [u8; 4],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            dimension: 3,
            parallel: false,
            random_fallback: false,
            sphere: SphereConfig::default(),
            link_color: DEFAULT_LINK_COLOR,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ProjectError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        if !(2..=3).contains(&self.dimension) {
            return Err(ProjectError::InvalidConfig(format!(
                "dimension must be 2 or 3, got {}",
                self.dimension
            )));
        }
        if !(self.sphere.radius > 0.0 && self.sphere.radius.is_finite()) {
            return Err(ProjectError::InvalidConfig(
                "sphere radius must be positive".into(),
            ));
        }
        if self.sphere.subdivisions > 6 {
            return Err(ProjectError::InvalidConfig(
                "sphere subdivisions above 6 are not supported".into(),
            ));
        }
        Ok(())
    }

    /// Options for the layout at position `index` of a request.
    pub fn compute_options<'a>(
        &self,
        index: usize,
        features: Option<&'a FeatureMatrix>,
    ) -> ComputeOptions<'a> {
        ComputeOptions {
            dimension: self.dimension,
            seed: self.seed.wrapping_add(index as u64),
            random: self.random_fallback,
            sphere: self.sphere,
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.dimension, 3);
        assert!(!config.parallel);
        assert!(!config.random_fallback);
        assert_eq!(config.sphere.subdivisions, 3);
        assert_eq!(config.sphere.radius, 1.0);
        assert_eq!(config.link_color, [200, 200, 200, 255]);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            PipelineConfig::from_json_str(r#"{"seed": 7, "sphere": {"radius": 2.0}}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.sphere.radius, 2.0);
        assert_eq!(config.sphere.subdivisions, 3);
        assert_eq!(config.dimension, 3);
    }

    #[test]
    fn bad_dimension_is_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"dimension": 4}"#).unwrap_err();
        assert!(matches!(err, ProjectError::InvalidConfig(_)));
    }

    #[test]
    fn layouts_get_consecutive_seeds() {
        let config = PipelineConfig::default();
        assert_eq!(config.compute_options(0, None).seed, 42);
        assert_eq!(config.compute_options(3, None).seed, 45);
    }
}
