//! Layout requests as they arrive from callers.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vrnetz_layout::{LayoutSpec, RawParams};

use crate::error::ProjectError;

/// One `(name, algorithm, parameters)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub name: String,
    pub algorithm: String,
    #[serde(default)]
    pub params: RawParams,
    /// Use random positions instead of the algorithm.
    #[serde(default)]
    pub random: bool,
}

impl LayoutRequest {
    pub fn new(name: impl Into<String>, algorithm: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            algorithm: algorithm.into(),
            params: RawParams::new(),
            random: false,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    /// Resolve the algorithm and validate the parameters.
    pub fn to_spec(&self) -> Result<LayoutSpec, ProjectError> {
        if self.name.trim().is_empty() {
            return Err(ProjectError::EmptyLayoutName);
        }
        let spec = LayoutSpec::parse(self.name.clone(), &self.algorithm, &self.params)?;
        Ok(spec.with_random(self.random))
    }
}

/// `name=algorithm[:key=value,key=value...]`, e.g.
/// `main=spring:iterations=100,opt_dist=0.2`. Values stay strings and are
/// read as numbers during validation.
impl FromStr for LayoutRequest {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, params) = match s.split_once(':') {
            Some((head, params)) => (head, Some(params)),
            None => (s, None),
        };
        let (name, algorithm) = head.split_once('=').unwrap_or((head, head));
        let mut request = LayoutRequest::new(name.trim(), algorithm.trim());
        if request.name.is_empty() {
            return Err(ProjectError::EmptyLayoutName);
        }
        for pair in params.into_iter().flat_map(|p| p.split(',')).filter(|p| !p.trim().is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ProjectError::Layout(vrnetz_layout::LayoutError::InvalidParameter {
                    name: pair.trim().to_string(),
                    reason: "expected key=value".into(),
                })
            })?;
            request = request.with_param(key.trim(), value.trim());
        }
        Ok(request)
    }
}

/// Read a JSON array of requests.
pub fn requests_from_json_str(text: &str) -> Result<Vec<LayoutRequest>, ProjectError> {
    Ok(serde_json::from_str(text)?)
}

pub fn requests_from_path(path: impl AsRef<Path>) -> Result<Vec<LayoutRequest>, ProjectError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    requests_from_json_str(&text)
}
