//! GraphML loading.
//!
//! Reads `<node id>` and `<edge source target>` elements together with their
//! `<data key>` children. Keys declared via `<key id attr.name>` are resolved
//! to their attribute names; undeclared keys are used verbatim. Data values
//! that parse as numbers become JSON numbers.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

use crate::error::NetworkError;
use crate::network::Network;
use crate::table::Row;
use crate::{LINK_END, LINK_START, NODE_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Node,
    Edge,
    Graph,
}

type Attrs = HashMap<String, String>;

fn local_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.to_string(),
    }
}

fn attributes(e: &BytesStart<'_>) -> Attrs {
    e.attributes()
        .filter_map(|a| a.ok())
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value);
            let value = unescape(&raw).map_or_else(|_| raw.to_string(), |v| v.into_owned());
            (local_name(a.key.as_ref()), value)
        })
        .collect()
}

fn data_value(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::from(f),
        _ => Value::String(text.to_string()),
    }
}

/// Append the text an entity or character reference stands for. Unknown
/// entities are kept verbatim.
fn push_reference(out: &mut String, reference: &BytesRef<'_>) {
    let name = reference.decode().unwrap_or_default();
    if let Some(text) = resolve_predefined_entity(&name) {
        out.push_str(text);
    } else if let Ok(Some(ch)) = reference.resolve_char_ref() {
        out.push(ch);
    } else {
        out.push('&');
        out.push_str(&name);
        out.push(';');
    }
}

#[derive(Default)]
struct GraphMlState {
    key_names: HashMap<String, String>,
    nodes: Vec<Row>,
    links: Vec<Row>,
    metadata: Row,
    stack: Vec<(Element, Row)>,
    data_key: Option<String>,
    data_text: String,
}

impl GraphMlState {
    fn open(&mut self, name: &str, attrs: Attrs, empty: bool) -> Result<(), NetworkError> {
        match name {
            "key" => {
                if let (Some(id), Some(attr_name)) = (attrs.get("id"), attrs.get("attr.name")) {
                    self.key_names.insert(id.clone(), attr_name.clone());
                }
            }
            "graph" => {
                if let Some(id) = attrs.get("id") {
                    self.metadata.insert("name".into(), Value::String(id.clone()));
                }
                if !empty {
                    self.stack.push((Element::Graph, Map::new()));
                }
            }
            "node" => {
                let id = attrs
                    .get("id")
                    .ok_or_else(|| NetworkError::GraphMl("<node> without id".into()))?;
                let mut row = Map::new();
                row.insert(NODE_ID.into(), data_value(id));
                self.push_row(Element::Node, row, empty);
            }
            "edge" => {
                let (Some(source), Some(target)) = (attrs.get("source"), attrs.get("target")) else {
                    return Err(NetworkError::GraphMl(
                        "<edge> without source/target".into(),
                    ));
                };
                let mut row = Map::new();
                row.insert(LINK_START.into(), data_value(source));
                row.insert(LINK_END.into(), data_value(target));
                if let Some(id) = attrs.get("id") {
                    row.insert("id".into(), Value::String(id.clone()));
                }
                self.push_row(Element::Edge, row, empty);
            }
            "data" => {
                let key = attrs
                    .get("key")
                    .ok_or_else(|| NetworkError::GraphMl("<data> without key".into()))?;
                self.data_key = Some(key.clone());
                self.data_text.clear();
                if empty {
                    self.close("data");
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn push_row(&mut self, element: Element, row: Row, empty: bool) {
        if empty {
            self.finish(element, row);
        } else {
            self.stack.push((element, row));
        }
    }

    fn finish(&mut self, element: Element, row: Row) {
        match element {
            Element::Node => self.nodes.push(row),
            Element::Edge => self.links.push(row),
            Element::Graph => self.metadata.extend(row),
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "data" => {
                let Some(key) = self.data_key.take() else {
                    return;
                };
                let column = self.key_names.get(&key).cloned().unwrap_or(key);
                let value = data_value(self.data_text.trim());
                if let Some((_, row)) = self.stack.last_mut() {
                    row.entry(column).or_insert(value);
                }
            }
            "node" | "edge" | "graph" => {
                if let Some((element, row)) = self.stack.pop() {
                    self.finish(element, row);
                }
            }
            _ => {}
        }
    }
}

/// Parse a GraphML document into a network.
pub fn parse_graphml(text: &str) -> Result<Network, NetworkError> {
    let mut reader = Reader::from_str(text);

    let mut state = GraphMlState::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.name().as_ref());
                state.open(&name, attributes(e), false)?;
            }
            Ok(Event::Empty(ref e)) => {
                let name = local_name(e.name().as_ref());
                state.open(&name, attributes(e), true)?;
            }
            Ok(Event::Text(ref e)) => {
                if state.data_key.is_some() {
                    let text = e.decode().unwrap_or_default();
                    state.data_text.push_str(&text);
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if state.data_key.is_some() {
                    push_reference(&mut state.data_text, e);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = local_name(e.name().as_ref());
                state.close(&name);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(NetworkError::GraphMl(format!(
                    "error at position {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    tracing::debug!(
        nodes = state.nodes.len(),
        links = state.links.len(),
        "parsed GraphML"
    );
    Ok(Network::new(state.nodes, state.links, state.metadata))
}

impl Network {
    pub fn from_graphml_str(text: &str) -> Result<Self, NetworkError> {
        parse_graphml(text)
    }

    pub fn from_graphml_path(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        parse_graphml(&text)
    }
}
