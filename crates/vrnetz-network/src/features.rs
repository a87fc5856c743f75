//! Per-node feature matrix for functional embeddings.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::NetworkError;
use crate::table::{cell_f64, id_key};

/// Dense feature rows keyed by node id. All rows share one width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    width: usize,
    rows: BTreeMap<String, Vec<f64>>,
}

impl FeatureMatrix {
    /// Build from `(node id, row)` pairs.
    pub fn from_rows<I, K>(rows: I) -> Result<Self, NetworkError>
    where
        I: IntoIterator<Item = (K, Vec<f64>)>,
        K: Into<String>,
    {
        let mut matrix = FeatureMatrix::default();
        for (id, row) in rows {
            let id = id.into();
            if matrix.rows.is_empty() {
                matrix.width = row.len();
            } else if row.len() != matrix.width {
                return Err(NetworkError::InvalidFeatures(format!(
                    "row `{id}` has {} features, expected {}",
                    row.len(),
                    matrix.width
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(NetworkError::InvalidFeatures(format!(
                    "row `{id}` contains a non-finite value"
                )));
            }
            matrix.rows.insert(id, row);
        }
        Ok(matrix)
    }

    /// Parse `{ "<node id>": [f64, ...], ... }`.
    pub fn from_value(value: &Value) -> Result<Self, NetworkError> {
        let Value::Object(map) = value else {
            return Err(NetworkError::InvalidFeatures(
                "expected an object of node id → feature array".into(),
            ));
        };
        let mut rows = Vec::with_capacity(map.len());
        for (id, cells) in map {
            let Value::Array(cells) = cells else {
                return Err(NetworkError::InvalidFeatures(format!(
                    "row `{id}` is not an array"
                )));
            };
            let row = cells
                .iter()
                .map(|c| {
                    cell_f64(c).ok_or_else(|| {
                        NetworkError::InvalidFeatures(format!("row `{id}` has a non-numeric cell"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push((id.clone(), row));
        }
        Self::from_rows(rows)
    }

    pub fn from_json_str(text: &str) -> Result<Self, NetworkError> {
        Self::from_value(&serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Build from a node-table column holding feature arrays.
    pub fn from_node_column(nodes: &[crate::Row], column: &str) -> Result<Self, NetworkError> {
        let mut rows = Vec::new();
        for (idx, row) in nodes.iter().enumerate() {
            let (Some(id), Some(cell)) = (row.get(crate::NODE_ID).and_then(id_key), row.get(column))
            else {
                continue;
            };
            let Value::Array(cells) = cell else {
                return Err(NetworkError::InvalidFeatures(format!(
                    "node row {idx}: `{column}` is not an array"
                )));
            };
            let values = cells.iter().filter_map(cell_f64).collect::<Vec<_>>();
            if values.len() != cells.len() {
                return Err(NetworkError::InvalidFeatures(format!(
                    "node row {idx}: `{column}` has a non-numeric cell"
                )));
            }
            rows.push((id, values));
        }
        Self::from_rows(rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&[f64]> {
        self.rows.get(id).map(Vec::as_slice)
    }

    /// True when node `id` has a row with at least one non-zero feature.
    pub fn has_features(&self, id: &str) -> bool {
        self.get(id).is_some_and(|row| row.iter().any(|&v| v != 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_object_rows() {
        let fm = FeatureMatrix::from_value(&json!({"a": [1, 0], "b": ["0", 0.0]})).unwrap();
        assert_eq!(fm.width(), 2);
        assert!(fm.has_features("a"));
        assert!(!fm.has_features("b"));
        assert!(!fm.has_features("missing"));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = FeatureMatrix::from_value(&json!({"a": [1, 0], "b": [1]})).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidFeatures(_)));
    }

    #[test]
    fn reads_node_column() {
        let nodes: Vec<crate::Row> = vec![
            json!({"id": 0, "go": [1.0, 0.0]}).as_object().cloned().unwrap(),
            json!({"id": 1}).as_object().cloned().unwrap(),
        ];
        let fm = FeatureMatrix::from_node_column(&nodes, "go").unwrap();
        assert_eq!(fm.len(), 1);
        assert_eq!(fm.get("0"), Some(&[1.0, 0.0][..]));
    }
}
