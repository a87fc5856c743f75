//! Integration tests for the complete VRNetz layout pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - VRNetz JSON → Graph → layout engine → normalized positions
//! - legacy layout migration next to freshly computed layouts
//! - link encoding and error reporting through the project pipeline
//!
//! Run with: cargo test --test integration_tests

use approx::assert_relative_eq;
use serde_json::json;
use tempfile::tempdir;
use vrnetz_layout::{centroid, compute, ComputeOptions, LayoutError, LayoutSpec, Point3, RawParams};
use vrnetz_network::Network;
use vrnetz_project::{LayoutRequest, Pipeline, ProjectError};

fn triangle_plus_isolated() -> Network {
    Network::from_value(json!({
        "network": {"name": "triangle"},
        "nodes": [
            {"id": "A"}, {"id": "B"}, {"id": "C"}, {"id": "D"}
        ],
        "links": [
            {"s": "A", "e": "B"},
            {"s": "B", "e": "C"},
            {"s": "C", "e": "A"}
        ]
    }))
    .unwrap()
}

fn assert_unit_cube(value: &serde_json::Value) {
    let coords = value.as_array().unwrap();
    assert_eq!(coords.len(), 3);
    for c in coords {
        let c = c.as_f64().unwrap();
        assert!((0.0..=1.0).contains(&c), "{c} outside [0, 1]");
    }
}

// ============================================================================
// Layout engine over a network
// ============================================================================

#[test]
fn test_isolated_node_sits_on_unit_sphere() {
    let net = triangle_plus_isolated();
    let graph = net.graph().unwrap();
    let spec = LayoutSpec::parse("main", "spring", &RawParams::new()).unwrap();
    let positions = compute(&graph, &spec, &ComputeOptions::default()).unwrap();

    let linked: Vec<Point3> = ["A", "B", "C"].iter().map(|id| positions[*id]).collect();
    let center = centroid(linked.iter()).unwrap();
    assert_relative_eq!(positions["D"].distance(center), 1.0, epsilon = 1e-9);
}

#[test]
fn test_pipeline_positions_are_normalized() {
    let mut net = triangle_plus_isolated();
    Pipeline::default()
        .run(&mut net, &[LayoutRequest::new("main", "spring")], None)
        .unwrap();
    for row in &net.nodes {
        assert_unit_cube(&row["main_pos"]);
        assert_unit_cube(&row["main2d_pos"]);
    }
}

#[test]
fn test_random_layout_is_normalized() {
    let mut net = triangle_plus_isolated();
    Pipeline::default()
        .run(&mut net, &[LayoutRequest::new("r", "random")], None)
        .unwrap();
    for row in &net.nodes {
        assert_unit_cube(&row["r_pos"]);
    }
}

// ============================================================================
// Legacy migration and links
// ============================================================================

#[test]
fn test_legacy_sizes_become_alpha() {
    let mut net = Network::from_value(json!({
        "nodes": [
            {"id": 1, "layouts": [{"p": [0.0, 0.0], "c": [10, 20, 30], "s": 10}]},
            {"id": 2, "layouts": [{"p": [4.0, 2.0], "c": [40, 50, 60], "s": 20}]}
        ],
        "links": []
    }))
    .unwrap();
    let report = Pipeline::default().run(&mut net, &[], None).unwrap();
    assert_eq!(report.migrated_rows, 2);
    assert_eq!(net.nodes[0]["cy_col"], json!([10, 20, 30, 127]));
    assert_eq!(net.nodes[1]["cy_col"], json!([40, 50, 60, 255]));
    assert_eq!(net.nodes[1]["cy_pos"], json!([1.0, 1.0, 0.0]));
}

#[test]
fn test_links_share_default_color() {
    let mut net = Network::from_value(json!({
        "nodes": [{"id": 1}, {"id": 2}, {"id": 3}],
        "links": [
            {"s": 1, "e": 2, "s_suid": 1, "e_suid": 2},
            {"s": 2, "e": 3, "s_suid": 2, "e_suid": 3},
            {"s": 3, "e": 1},
            {"s": 1, "e": 3},
            {"s": 2, "e": 1, "score": 0.4}
        ]
    }))
    .unwrap();
    Pipeline::default().run(&mut net, &[], None).unwrap();
    assert_eq!(net.links.len(), 5);
    for link in &net.links {
        assert_eq!(link["all_col"], json!([200, 200, 200, 255]));
        assert!(!link.contains_key("s_suid"));
        assert!(!link.contains_key("e_suid"));
    }
    assert_eq!(net.links[4]["score"], json!(0.4));
}

// ============================================================================
// Errors and file round-trips
// ============================================================================

#[test]
fn test_unknown_algorithm_is_typed_error() {
    let mut net = triangle_plus_isolated();
    let before = net.clone();
    let err = Pipeline::default()
        .run(&mut net, &[LayoutRequest::new("x", "force_atlas")], None)
        .unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Layout(LayoutError::UnknownAlgorithm(ref name)) if name == "force_atlas"
    ));
    assert_eq!(net, before);
}

#[test]
fn test_processed_network_round_trips_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("processed.json");

    let mut net = triangle_plus_isolated();
    Pipeline::default()
        .run(&mut net, &[LayoutRequest::new("kk", "kamada_kawai")], None)
        .unwrap();
    net.write_to_path(&path, true).unwrap();

    let reloaded = Network::from_path(&path).unwrap();
    assert_eq!(reloaded.size(), (4, 3));
    let (saved, written) = (&reloaded.nodes[3]["kk_pos"], &net.nodes[3]["kk_pos"]);
    for axis in 0..3 {
        assert_relative_eq!(
            saved[axis].as_f64().unwrap(),
            written[axis].as_f64().unwrap(),
            epsilon = 1e-12
        );
    }
}

// ============================================================================
// Source hygiene
// ============================================================================

fn rust_sources(dir: &std::path::Path, out: &mut Vec<std::path::PathBuf>) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            if path.file_name().is_some_and(|name| name != "target") {
                rust_sources(&path, out);
            }
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

#[test]
fn test_source_lines_fit_rustfmt_width() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut files = Vec::new();
    rust_sources(&root.join("crates"), &mut files);
    rust_sources(&root.join("tests"), &mut files);
    assert!(!files.is_empty());

    let mut long = Vec::new();
    for file in &files {
        let text = std::fs::read_to_string(file).unwrap();
        for (idx, line) in text.lines().enumerate() {
            if line.chars().count() > 100 {
                long.push(format!("{}:{}", file.display(), idx + 1));
            }
        }
    }
    assert!(long.is_empty(), "lines over 100 columns: {long:?}");
}
