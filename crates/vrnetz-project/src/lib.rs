//! VRNetz layout projects
//!
//! Runs a list of layout requests against a [`vrnetz_network::Network`] and
//! writes the results back into it:
//! - every layout becomes `<name>_pos` and `<name>2d_pos` node columns
//! - legacy nested single-layout rows are migrated to `cy_pos`/`cy_col`/`size`
//! - every link gets the default `all_col` color; join columns are dropped
//!
//! See [`Pipeline::run`] for the order of operations and failure policy.

pub mod accumulator;
pub mod config;
pub mod error;
pub mod legacy;
pub mod links;
pub mod pipeline;
pub mod request;

pub use accumulator::{
    check_layout_columns, layout_columns, planar_column, position_column, LayoutAccumulator,
    RESERVED_COLUMNS,
};
pub use config::PipelineConfig;
pub use error::ProjectError;
pub use legacy::{has_legacy_layout, migrate_legacy_layout};
pub use links::{LinkEncoder, DEFAULT_LINK_COLOR};
pub use pipeline::{LayoutSummary, Pipeline, PipelineReport};
pub use request::{requests_from_json_str, requests_from_path, LayoutRequest};
