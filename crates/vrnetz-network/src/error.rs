use thiserror::Error;

/// Malformed input while building or loading a network.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network is missing the `{0}` table")]
    MissingTable(&'static str),

    #[error("`{section}` must be {expected}")]
    InvalidSection {
        section: &'static str,
        expected: &'static str,
    },

    #[error("node row {row} has no usable `id`")]
    MissingNodeId { row: usize },

    #[error("duplicate node id `{id}` (rows {first} and {second})")]
    DuplicateNodeId {
        id: String,
        first: usize,
        second: usize,
    },

    #[error("link row {row} is missing its `{column}` endpoint")]
    MissingEndpoint { row: usize, column: &'static str },

    #[error("link row {row} references unknown node `{id}`")]
    UnknownNode { row: usize, id: String },

    #[error("invalid feature matrix: {0}")]
    InvalidFeatures(String),

    #[error("GraphML error: {0}")]
    GraphMl(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
