//! The layout pipeline for one network.
//!
//! graph → layouts (computed, normalized) → legacy migration → merge into
//! nodes → link encoding
//!
//! All layouts are computed before the network is touched: any error aborts
//! the whole request and leaves the network as it was.

use rayon::prelude::*;
use serde::Serialize;
use vrnetz_layout::{Layout, LayoutSpec};
use vrnetz_network::{FeatureMatrix, Graph, Network};

use crate::accumulator::{check_layout_columns, LayoutAccumulator};
use crate::config::PipelineConfig;
use crate::error::ProjectError;
use crate::legacy::migrate_legacy_layout;
use crate::links::LinkEncoder;
use crate::request::LayoutRequest;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSummary {
    pub name: String,
    pub algorithm: String,
    pub nodes: usize,
}

/// What a run did to the network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub layouts: Vec<LayoutSummary>,
    pub migrated_rows: usize,
    pub string_network: bool,
    pub nodes: usize,
    pub links: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, ProjectError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validate every request. Names must be unique and the columns they
    /// derive must not overlap each other or the legacy columns.
    pub fn specs(&self, requests: &[LayoutRequest]) -> Result<Vec<LayoutSpec>, ProjectError> {
        check_layout_columns(requests.iter().map(|r| r.name.as_str()))?;
        requests.iter().map(LayoutRequest::to_spec).collect()
    }

    fn compute_one(
        &self,
        graph: &Graph,
        index: usize,
        spec: &LayoutSpec,
        features: Option<&FeatureMatrix>,
    ) -> Result<Layout, ProjectError> {
        let mut layout = Layout::new(spec.clone());
        layout.calculate(graph, &self.config.compute_options(index, features))?;
        layout.normalize(self.config.dimension);
        Ok(layout)
    }

    /// Computed and normalized layouts, in request order.
    pub fn compute_layouts(
        &self,
        graph: &Graph,
        specs: &[LayoutSpec],
        features: Option<&FeatureMatrix>,
    ) -> Result<Vec<Layout>, ProjectError> {
        if self.config.parallel {
            specs
                .par_iter()
                .enumerate()
                .map(|(i, spec)| self.compute_one(graph, i, spec, features))
                .collect()
        } else {
            specs
                .iter()
                .enumerate()
                .map(|(i, spec)| self.compute_one(graph, i, spec, features))
                .collect()
        }
    }

    pub fn run(
        &self,
        network: &mut Network,
        requests: &[LayoutRequest],
        features: Option<&FeatureMatrix>,
    ) -> Result<PipelineReport, ProjectError> {
        let specs = self.specs(requests)?;
        let graph = network.graph()?;
        let string_network = network.is_string_network();
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            layouts = specs.len(),
            string_network,
            "starting layout pipeline"
        );

        let layouts = self.compute_layouts(&graph, &specs, features)?;

        let migrated_rows = migrate_legacy_layout(&mut network.nodes)?;
        let mut accumulator = LayoutAccumulator::new();
        for layout in layouts {
            accumulator.add(layout)?;
        }
        accumulator.merge_into_nodes(&mut network.nodes);
        LinkEncoder::new(self.config.link_color).encode(&mut network.links);

        let (nodes, links) = network.size();
        let report = PipelineReport {
            layouts: accumulator
                .layouts()
                .iter()
                .map(|l| LayoutSummary {
                    name: l.name().to_string(),
                    algorithm: l.spec.algorithm.name(),
                    nodes: l.positions.len(),
                })
                .collect(),
            migrated_rows,
            string_network,
            nodes,
            links,
        };
        tracing::info!(
            layouts = report.layouts.len(),
            migrated_rows,
            nodes,
            links,
            "layout pipeline finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn network() -> Network {
        Network::from_value(json!({
            "network": {"database": "STRING"},
            "nodes": [{"id": "A"}, {"id": "B"}, {"id": "C"}, {"id": "D"}],
            "links": [{"s": "A", "e": "B", "s_suid": 1}, {"s": "B", "e": "C"}]
        }))
        .unwrap()
    }

    #[test]
    fn duplicate_names_fail_before_any_work() {
        let mut net = network();
        let before = net.clone();
        let requests = [LayoutRequest::new("x", "spring"), LayoutRequest::new("x", "random")];
        let err = Pipeline::default().run(&mut net, &requests, None).unwrap_err();
        assert!(matches!(err, ProjectError::DuplicateLayoutName(_)));
        assert_eq!(net, before);
    }

    #[test]
    fn overlapping_columns_fail_before_any_work() {
        let mut net = network();
        let before = net.clone();
        let requests = [LayoutRequest::new("a", "random"), LayoutRequest::new("a2d", "random")];
        let err = Pipeline::default().run(&mut net, &requests, None).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::ColumnCollision { ref column, .. } if column == "a2d_pos"
        ));
        assert_eq!(net, before);
    }

    #[test]
    fn failing_layout_leaves_network_unchanged() {
        let mut net = network();
        let before = net.clone();
        let requests = [
            LayoutRequest::new("ok", "spring"),
            LayoutRequest::new("needs_features", "cg_functional_tsne"),
        ];
        let err = Pipeline::default().run(&mut net, &requests, None).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Layout(vrnetz_layout::LayoutError::MissingFeatureMatrix(_))
        ));
        assert_eq!(net, before);
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let requests = [
            LayoutRequest::new("a", "spring"),
            LayoutRequest::new("b", "kamada_kawai"),
            LayoutRequest::new("c", "cg_global_tsne"),
        ];
        let mut seq = network();
        let mut par = network();
        Pipeline::default().run(&mut seq, &requests, None).unwrap();
        let parallel = Pipeline::new(PipelineConfig {
            parallel: true,
            ..PipelineConfig::default()
        })
        .unwrap();
        parallel.run(&mut par, &requests, None).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn report_describes_run() {
        let mut net = network();
        let report = Pipeline::default()
            .run(&mut net, &[LayoutRequest::new("main", "spring")], None)
            .unwrap();
        assert!(report.string_network);
        assert_eq!(report.nodes, 4);
        assert_eq!(report.links, 2);
        assert_eq!(report.layouts[0].nodes, 4);
        assert_eq!(report.migrated_rows, 0);
        assert!(net.nodes.iter().all(|row| row.contains_key("main_pos")));
    }
}
