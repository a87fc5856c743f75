use thiserror::Error;
use vrnetz_layout::LayoutError;
use vrnetz_network::NetworkError;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Layout names become column names and must be unique per request.
    #[error("layout name `{0}` is used more than once")]
    DuplicateLayoutName(String),

    #[error("layout `{layout}` would write column `{column}`, which is already taken")]
    ColumnCollision { layout: String, column: String },

    #[error("layout name must not be empty")]
    EmptyLayoutName,

    #[error("legacy layout of node row {row} is malformed: {reason}")]
    InvalidLegacyLayout { row: usize, reason: String },

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
