//! Graph view derived from the node and link tables.
//!
//! The graph is disposable: it is rebuilt from the tables whenever needed and
//! never written back. Edges are undirected and unweighted; self-loops and
//! duplicate links are kept as given.

use ahash::AHashMap;

use crate::error::NetworkError;
use crate::table::{compact_row, id_key, Row};
use crate::{LINK_END, LINK_START, NODE_ID};

/// A node and its attribute payload (row without missing cells).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub attrs: Row,
}

/// Undirected multigraph over the rows of a node table.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    index: AHashMap<String, usize>,
    edges: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
}

/// Split of the node set by degree, recomputed per layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Graph indices of nodes with degree > 0, in node-table order.
    pub linked: Vec<usize>,
    /// Graph indices of nodes with degree 0, in node-table order.
    pub isolated: Vec<usize>,
}

impl Graph {
    /// Build the graph from a node table and a link table.
    ///
    /// Node `i` of the graph is row `i` of `nodes`. Fails if a node row has no
    /// id, an id repeats, or a link endpoint is missing or unknown.
    pub fn from_tables(nodes: &[Row], links: &[Row]) -> Result<Self, NetworkError> {
        let mut graph = Graph {
            nodes: Vec::with_capacity(nodes.len()),
            index: AHashMap::with_capacity(nodes.len()),
            edges: Vec::with_capacity(links.len()),
            adjacency: vec![Vec::new(); nodes.len()],
        };

        for (row_idx, row) in nodes.iter().enumerate() {
            let id = row
                .get(NODE_ID)
                .and_then(id_key)
                .ok_or(NetworkError::MissingNodeId { row: row_idx })?;
            if let Some(&first) = graph.index.get(&id) {
                return Err(NetworkError::DuplicateNodeId {
                    id,
                    first,
                    second: row_idx,
                });
            }
            graph.index.insert(id.clone(), row_idx);
            graph.nodes.push(GraphNode {
                id,
                attrs: compact_row(row),
            });
        }

        for (row_idx, row) in links.iter().enumerate() {
            let start = graph.endpoint(row, row_idx, LINK_START)?;
            let end = graph.endpoint(row, row_idx, LINK_END)?;
            graph.edges.push((start, end));
            graph.adjacency[start].push(end);
            graph.adjacency[end].push(start);
        }

        tracing::debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "built graph"
        );
        Ok(graph)
    }

    fn endpoint(
        &self,
        row: &Row,
        row_idx: usize,
        column: &'static str,
    ) -> Result<usize, NetworkError> {
        let key = row
            .get(column)
            .and_then(id_key)
            .ok_or(NetworkError::MissingEndpoint { row: row_idx, column })?;
        self.index
            .get(&key)
            .copied()
            .ok_or(NetworkError::UnknownNode { row: row_idx, id: key })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Graph index of node `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    /// Attribute payload of node `id`.
    pub fn node_attrs(&self, id: &str) -> Option<&Row> {
        self.node(id).map(|n| &n.attrs)
    }

    /// Number of edge endpoints at node `idx` (a self-loop counts twice).
    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency.get(idx).map_or(0, Vec::len)
    }

    /// Neighbor indices of node `idx`, with multiplicity.
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        self.adjacency.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn partition(&self) -> Partition {
        let mut partition = Partition::default();
        for idx in 0..self.nodes.len() {
            if self.degree(idx) > 0 {
                partition.linked.push(idx);
            } else {
                partition.isolated.push(idx);
            }
        }
        partition
    }

    /// Induced simple subgraph over `members` (graph indices).
    ///
    /// Local index `i` of the result is `members[i]`. Self-loops and duplicate
    /// edges collapse; edges leaving the member set are dropped.
    pub fn subgraph(&self, members: &[usize]) -> Subgraph {
        let mut local: AHashMap<usize, usize> = AHashMap::with_capacity(members.len());
        for (i, &g) in members.iter().enumerate() {
            local.insert(g, i);
        }

        let mut neighbors = vec![Vec::new(); members.len()];
        for (i, &g) in members.iter().enumerate() {
            let mut adj: Vec<usize> = self
                .neighbors(g)
                .iter()
                .filter_map(|n| local.get(n).copied())
                .filter(|&j| j != i)
                .collect();
            adj.sort_unstable();
            adj.dedup();
            neighbors[i] = adj;
        }

        Subgraph {
            ids: members.iter().map(|&g| self.nodes[g].id.clone()).collect(),
            neighbors,
        }
    }
}

/// Simple undirected graph with dense local indices, the input of every
/// layout algorithm.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subgraph {
    ids: Vec<String>,
    neighbors: Vec<Vec<usize>>,
}

impl Subgraph {
    /// Build directly from ids and local edges (used by tests and callers
    /// that already hold a compact graph).
    pub fn from_edges(ids: Vec<String>, edges: &[(usize, usize)]) -> Self {
        let mut neighbors = vec![Vec::new(); ids.len()];
        for &(a, b) in edges {
            if a == b || a >= ids.len() || b >= ids.len() {
                continue;
            }
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
        for adj in &mut neighbors {
            adj.sort_unstable();
            adj.dedup();
        }
        Self { ids, neighbors }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    pub fn degree(&self, i: usize) -> usize {
        self.neighbors[i].len()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.neighbors[a].binary_search(&b).is_ok()
    }

    /// Each undirected edge once, as `(lo, hi)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(i, adj)| adj.iter().filter(move |&&j| j > i).map(move |&j| (i, j)))
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Breadth-first hop distances from `source`; `None` when unreachable.
    pub fn bfs_distances(&self, source: usize) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.len()];
        let mut queue = std::collections::VecDeque::new();
        dist[source] = Some(0);
        queue.push_back(source);
        while let Some(u) = queue.pop_front() {
            let d = dist[u].unwrap_or(0);
            for &v in &self.neighbors[u] {
                if dist[v].is_none() {
                    dist[v] = Some(d + 1);
                    queue.push_back(v);
                }
            }
        }
        dist
    }
}
