//! Property tests for layout computation

use proptest::prelude::*;
use serde_json::json;
use vrnetz_layout::*;
use vrnetz_network::{Graph, Network};

fn build(n: usize, edges: &[(usize, usize)]) -> Graph {
    let nodes = (0..n).map(|i| json!({"id": format!("n{i}")})).collect::<Vec<_>>();
    let links = edges
        .iter()
        .map(|&(s, e)| json!({"s": format!("n{s}"), "e": format!("n{e}")}))
        .collect::<Vec<_>>();
    Network::from_value(json!({"nodes": nodes, "links": links}))
        .unwrap()
        .graph()
        .unwrap()
}

fn small_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    // Keep graphs small: every algorithm here is quadratic per iteration.
    (1usize..12).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n), 0..16);
        (Just(n), edges)
    })
}

fn algorithm() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(
        Algorithm::catalog()
            .into_iter()
            .filter(|a| a.is_implemented() && !a.needs_features())
            .collect::<Vec<_>>(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_node_gets_a_finite_position((n, edges) in small_graph(), algorithm in algorithm()) {
        let graph = build(n, &edges);
        let spec = LayoutSpec::new("p", algorithm, &RawParams::new()).unwrap();
        let positions = compute(&graph, &spec, &ComputeOptions::default()).unwrap();
        prop_assert_eq!(positions.len(), n);
        for p in positions.values() {
            prop_assert!(p.is_finite());
        }
    }

    #[test]
    fn isolated_nodes_sit_on_sphere_around_linked_centroid((n, edges) in small_graph()) {
        let graph = build(n, &edges);
        let spec = LayoutSpec::parse("s", "spring", &RawParams::new()).unwrap();
        let positions = compute(&graph, &spec, &ComputeOptions::default()).unwrap();

        let partition = graph.partition();
        let id = |i: usize| graph.nodes()[i].id.clone();
        let linked: Vec<Point3> = partition.linked.iter().map(|&i| positions[&id(i)]).collect();
        let center = centroid(linked.iter()).unwrap_or(Point3::ORIGIN);
        for &i in &partition.isolated {
            prop_assert!((positions[&id(i)].distance(center) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn normalized_layouts_fit_the_unit_cube((n, edges) in small_graph(), algorithm in algorithm()) {
        let graph = build(n, &edges);
        let spec = LayoutSpec::new("p", algorithm, &RawParams::new()).unwrap();
        let mut layout = Layout::new(spec);
        layout.calculate(&graph, &ComputeOptions::default()).unwrap();
        layout.normalize(3);
        for p in layout.positions.values() {
            for axis in 0..3 {
                prop_assert!((0.0..=1.0).contains(&p.axis(axis)));
            }
        }
    }
}

#[test]
fn seeds_change_the_layout() {
    let graph = build(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
    let spec = LayoutSpec::parse("s", "spring", &RawParams::new()).unwrap();
    let a = compute(&graph, &spec, &ComputeOptions::default().with_seed(1)).unwrap();
    let b = compute(&graph, &spec, &ComputeOptions::default().with_seed(2)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn algorithm_catalog_lists_every_family() {
    let names: Vec<String> = Algorithm::catalog().iter().map(Algorithm::name).collect();
    assert!(names.contains(&"spring".to_string()));
    assert!(names.contains(&"kamada_kawai".to_string()));
    assert!(names.contains(&"cg_functional_umap".to_string()));
    assert_eq!(names.len(), 13);
}
