//! The VRNetz container: node table, link table, and metadata.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::NetworkError;
use crate::graph::Graph;
use crate::sections;
use crate::table::Row;

/// Databases whose exports get STRING-specific link evidence handling.
const STRING_DATABASES: [&str; 2] = ["string", "stitch"];

/// A network as uploaded: three tabular sections plus any extra top-level keys.
///
/// The pipeline owns one `Network` per request and mutates it in place as
/// layouts are merged; row order of `nodes` and `links` is always preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Network {
    pub nodes: Vec<Row>,
    pub links: Vec<Row>,
    pub network: Row,
    /// Top-level keys other than the three sections, kept for round-trips.
    #[serde(flatten)]
    pub extra: Row,
}

impl Network {
    pub fn new(nodes: Vec<Row>, links: Vec<Row>, network: Row) -> Self {
        Self {
            nodes,
            links,
            network,
            extra: Map::new(),
        }
    }

    /// Build from a parsed VRNetz document.
    ///
    /// `nodes` and `links` are required and may be either record-oriented
    /// (an array of row objects) or column-oriented (an object of columns).
    /// `network` is optional.
    pub fn from_value(value: Value) -> Result<Self, NetworkError> {
        let Value::Object(mut doc) = value else {
            return Err(NetworkError::InvalidSection {
                section: "document",
                expected: "a JSON object",
            });
        };

        let nodes = doc
            .remove(sections::NODES)
            .ok_or(NetworkError::MissingTable(sections::NODES))
            .and_then(|v| rows_from_value(v, sections::NODES))?;
        let links = doc
            .remove(sections::LINKS)
            .ok_or(NetworkError::MissingTable(sections::LINKS))
            .and_then(|v| rows_from_value(v, sections::LINKS))?;
        let network = match doc.remove(sections::NETWORK) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(meta)) => meta,
            Some(_) => {
                return Err(NetworkError::InvalidSection {
                    section: sections::NETWORK,
                    expected: "an object",
                })
            }
        };

        tracing::debug!(
            nodes = nodes.len(),
            links = links.len(),
            extra_keys = doc.len(),
            "loaded network document"
        );

        Ok(Self {
            nodes,
            links,
            network,
            extra: doc,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self, NetworkError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Load a VRNetz JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String, NetworkError> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>, pretty: bool) -> Result<(), NetworkError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json_string(pretty)?)?;
        Ok(())
    }

    /// `(number of nodes, number of links)`.
    pub fn size(&self) -> (usize, usize) {
        (self.nodes.len(), self.links.len())
    }

    /// The `network.database` tag, if present.
    pub fn database(&self) -> Option<&str> {
        self.network.get("database").and_then(Value::as_str)
    }

    /// True when the network was exported from STRING or STITCH.
    pub fn is_string_network(&self) -> bool {
        self.database().is_some_and(|db| {
            STRING_DATABASES
                .iter()
                .any(|known| db.trim().eq_ignore_ascii_case(known))
        })
    }

    /// True if any node row has column `name`.
    pub fn has_node_column(&self, name: &str) -> bool {
        self.nodes.iter().any(|row| row.contains_key(name))
    }

    /// True if any link row has column `name`.
    pub fn has_link_column(&self, name: &str) -> bool {
        self.links.iter().any(|row| row.contains_key(name))
    }

    /// Derive the graph view of this network.
    pub fn graph(&self) -> Result<Graph, NetworkError> {
        Graph::from_tables(&self.nodes, &self.links)
    }
}

/// Accept a table as an array of row objects or as an object of columns.
///
/// Columns may be arrays (positional) or objects keyed by row index, which is
/// how column-oriented exports write them.
fn rows_from_value(value: Value, section: &'static str) -> Result<Vec<Row>, NetworkError> {
    let invalid = || NetworkError::InvalidSection {
        section,
        expected: "an array of row objects or an object of columns",
    };
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                _ => Err(invalid()),
            })
            .collect(),
        Value::Object(columns) => {
            let mut rows: BTreeMap<usize, Row> = BTreeMap::new();
            for (column, cells) in columns {
                match cells {
                    Value::Array(cells) => {
                        for (idx, cell) in cells.into_iter().enumerate() {
                            rows.entry(idx).or_default().insert(column.clone(), cell);
                        }
                    }
                    Value::Object(cells) => {
                        for (idx, cell) in cells {
                            let idx: usize = idx.parse().map_err(|_| invalid())?;
                            rows.entry(idx).or_default().insert(column.clone(), cell);
                        }
                    }
                    _ => return Err(invalid()),
                }
            }
            Ok(rows.into_values().collect())
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_tables_are_reported() {
        let err = Network::from_value(json!({"links": []})).unwrap_err();
        assert!(matches!(err, NetworkError::MissingTable("nodes")));

        let err = Network::from_value(json!({"nodes": []})).unwrap_err();
        assert!(matches!(err, NetworkError::MissingTable("links")));
    }

    #[test]
    fn column_oriented_tables_are_transposed() {
        let net = Network::from_value(json!({
            "nodes": {"id": {"0": 10, "1": 11}, "name": {"0": "a", "1": "b"}},
            "links": {"s": [10], "e": [11]},
        }))
        .unwrap();
        assert_eq!(net.size(), (2, 1));
        assert_eq!(net.nodes[1]["name"], json!("b"));
        assert_eq!(net.links[0]["e"], json!(11));
    }

    #[test]
    fn string_database_flag() {
        let mut net = Network::from_value(json!({
            "nodes": [], "links": [], "network": {"database": "STRING"}
        }))
        .unwrap();
        assert!(net.is_string_network());

        net.network.insert("database".into(), json!("uniprot"));
        assert!(!net.is_string_network());

        net.network.clear();
        assert!(!net.is_string_network());
    }

    #[test]
    fn extra_top_level_keys_round_trip() {
        let net = Network::from_value(json!({
            "nodes": [{"id": 0}], "links": [], "layouts": [{"name": "cy"}]
        }))
        .unwrap();
        let text = net.to_json_string(false).unwrap();
        let back = Network::from_json_str(&text).unwrap();
        assert_eq!(back, net);
        assert!(back.extra.contains_key("layouts"));
    }
}
