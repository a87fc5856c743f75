//! Network loading and graph construction tests

use proptest::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use vrnetz_network::*;

fn sample_document() -> serde_json::Value {
    json!({
        "network": {"name": "toy", "database": "string"},
        "nodes": [
            {"id": 0, "n": "TP53", "uniprot": "P04637"},
            {"id": 1, "n": "MDM2", "uniprot": ""},
            {"id": 2, "n": "CDKN1A", "uniprot": null},
            {"id": 3, "n": "ORPHAN"}
        ],
        "links": [
            {"id": 0, "s": 0, "e": 1, "s_suid": 100, "e_suid": 101},
            {"id": 1, "s": 1, "e": 2, "s_suid": 101, "e_suid": 102}
        ]
    })
}

// ============================================================================
// VRNetz files
// ============================================================================

#[test]
fn test_vrnetz_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("toy.VRNetz");

    let net = Network::from_value(sample_document()).unwrap();
    net.write_to_path(&path, true).unwrap();

    let back = Network::from_path(&path).unwrap();
    assert_eq!(back, net);
    assert!(back.is_string_network());
    assert_eq!(back.size(), (4, 2));
}

#[test]
fn test_graph_payload_drops_empty_cells() {
    let net = Network::from_value(sample_document()).unwrap();
    let graph = net.graph().unwrap();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 2);

    let mdm2 = graph.node_attrs("1").unwrap();
    assert_eq!(mdm2.get("n"), Some(&json!("MDM2")));
    assert!(!mdm2.contains_key("uniprot"));

    let cdkn = graph.node_attrs("2").unwrap();
    assert!(!cdkn.contains_key("uniprot"));

    // The table itself is untouched.
    assert_eq!(net.nodes[1].get("uniprot"), Some(&json!("")));
}

#[test]
fn test_partition_splits_isolated_nodes() {
    let net = Network::from_value(sample_document()).unwrap();
    let graph = net.graph().unwrap();
    let partition = graph.partition();

    assert_eq!(partition.linked, vec![0, 1, 2]);
    assert_eq!(partition.isolated, vec![3]);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = Network::from_path(dir.path().join("nope.VRNetz")).unwrap_err();
    assert!(matches!(err, NetworkError::Io(_)));
}

#[test]
fn test_invalid_json_is_json_error() {
    let err = Network::from_json_str("{not json").unwrap_err();
    assert!(matches!(err, NetworkError::Json(_)));
}

#[test]
fn test_feature_matrix_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("features.json");
    std::fs::write(&path, r#"{"0": [0.5, 1.0], "1": [0, 0]}"#).unwrap();

    let fm = FeatureMatrix::from_path(&path).unwrap();
    assert_eq!(fm.width(), 2);
    assert!(fm.has_features("0"));
    assert!(!fm.has_features("1"));
}

// ============================================================================
// Properties
// ============================================================================

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..40).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n), 0..80);
        (Just(n), edges)
    })
}

fn build(n: usize, edges: &[(usize, usize)]) -> Network {
    let nodes = (0..n).map(|i| json!({"id": i})).collect::<Vec<_>>();
    let links = edges
        .iter()
        .map(|&(s, e)| json!({"s": s, "e": e}))
        .collect::<Vec<_>>();
    Network::from_value(json!({"nodes": nodes, "links": links})).unwrap()
}

proptest! {
    #[test]
    fn edge_set_matches_link_table((n, edges) in graph_strategy()) {
        let net = build(n, &edges);
        let graph = net.graph().unwrap();
        prop_assert_eq!(graph.node_count(), n);
        prop_assert_eq!(graph.edge_count(), edges.len());
    }

    #[test]
    fn partition_covers_every_node_once((n, edges) in graph_strategy()) {
        let net = build(n, &edges);
        let graph = net.graph().unwrap();
        let p = graph.partition();
        prop_assert_eq!(p.linked.len() + p.isolated.len(), n);
        for &i in &p.isolated {
            prop_assert_eq!(graph.degree(i), 0);
        }
        for &i in &p.linked {
            prop_assert!(graph.degree(i) > 0);
        }
    }
}
