//! Subcommand implementations.

use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::{json, Value};
use vrnetz_layout::{Algorithm, LayoutParams};
use vrnetz_network::{FeatureMatrix, Network};
use vrnetz_project::{requests_from_path, LayoutRequest, Pipeline, PipelineConfig};

use crate::ApplyArgs;

// ============================================================================
// Loading
// ============================================================================

fn is_graphml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("graphml") || ext.eq_ignore_ascii_case("xml"))
}

fn load_network(path: &Path) -> Result<Network> {
    let network = if is_graphml(path) {
        Network::from_graphml_path(path)
    } else {
        Network::from_path(path)
    };
    network.with_context(|| format!("failed to load network from {}", path.display()))
}

fn load_config(args: &ApplyArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(dimension) = args.dimension {
        config.dimension = dimension;
    }
    config.parallel |= args.parallel;
    config.random_fallback |= args.random;
    config.validate()?;
    Ok(config)
}

fn load_requests(args: &ApplyArgs) -> Result<Vec<LayoutRequest>> {
    let mut requests = match &args.requests {
        Some(path) => requests_from_path(path)
            .with_context(|| format!("failed to load requests from {}", path.display()))?,
        None => Vec::new(),
    };
    for spec in &args.layouts {
        let request: LayoutRequest = spec
            .parse()
            .with_context(|| format!("invalid --layout '{spec}'"))?;
        requests.push(request);
    }
    Ok(requests)
}

fn load_features(args: &ApplyArgs, network: &Network) -> Result<Option<FeatureMatrix>> {
    if let Some(path) = &args.features {
        let features = FeatureMatrix::from_path(path)
            .with_context(|| format!("failed to load features from {}", path.display()))?;
        return Ok(Some(features));
    }
    if let Some(column) = &args.features_column {
        if !network.has_node_column(column) {
            bail!("no node has a '{column}' column");
        }
        return Ok(Some(FeatureMatrix::from_node_column(&network.nodes, column)?));
    }
    Ok(None)
}

// ============================================================================
// apply
// ============================================================================

pub fn cmd_apply(args: &ApplyArgs) -> Result<()> {
    let config = load_config(args)?;
    let requests = load_requests(args)?;
    let mut network = load_network(&args.input)?;
    let features = load_features(args, &network)?;

    if requests.is_empty() {
        tracing::warn!("no layouts requested; only legacy migration and link encoding will run");
    }

    let pipeline = Pipeline::new(config)?;
    let report = pipeline.run(&mut network, &requests, features.as_ref())?;

    network
        .write_to_path(&args.out, !args.compact)
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    for layout in &report.layouts {
        println!(
            "{} {} ({}, {} nodes)",
            "ok".green().bold(),
            layout.name.bold(),
            layout.algorithm,
            layout.nodes
        );
    }
    if report.migrated_rows > 0 {
        println!(
            "{} migrated {} legacy layout rows",
            "ok".green().bold(),
            report.migrated_rows
        );
    }
    println!(
        "{} {} ({} nodes, {} links)",
        "wrote".green().bold(),
        args.out.display().to_string().bold(),
        report.nodes,
        report.links
    );
    Ok(())
}

// ============================================================================
// algorithms
// ============================================================================

fn default_params(algorithm: &Algorithm) -> Result<Value> {
    let mut value = serde_json::to_value(LayoutParams::defaults_for(algorithm))?;
    if let Some(object) = value.as_object_mut() {
        object.remove("family");
    }
    Ok(value)
}

pub fn cmd_algorithms(json: bool) -> Result<()> {
    let catalog = Algorithm::catalog();

    if json {
        let entries = catalog
            .iter()
            .map(|algorithm| -> Result<Value> {
                Ok(json!({
                    "name": algorithm.name(),
                    "implemented": algorithm.is_implemented(),
                    "needs_features": algorithm.needs_features(),
                    "defaults": default_params(algorithm)?,
                }))
            })
            .collect::<Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", "Layout algorithms".bold());
    for algorithm in &catalog {
        let status = if algorithm.is_implemented() {
            "ready".green()
        } else {
            "reserved".yellow()
        };
        let features = if algorithm.needs_features() {
            " [features]".cyan().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:<24} {:<8}{} {}",
            algorithm.name(),
            status,
            features,
            default_params(algorithm)?
        );
    }
    Ok(())
}

// ============================================================================
// inspect
// ============================================================================

pub fn cmd_inspect(input: &Path) -> Result<()> {
    let network = load_network(input)?;
    let graph = network.graph()?;
    let partition = graph.partition();
    let (nodes, links) = network.size();

    println!("{} {}", "network".bold(), input.display());
    println!("  nodes:     {nodes}");
    println!("  links:     {links}");
    println!("  linked:    {}", partition.linked.len());
    println!("  isolated:  {}", partition.isolated.len());
    println!("  database:  {}", network.database().unwrap_or("-"));
    if network.is_string_network() {
        println!("  {}", "STRING network".cyan());
    }
    if vrnetz_project::has_legacy_layout(&network.nodes) {
        println!("  {}", "has legacy layouts".yellow());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphml_detection() {
        assert!(is_graphml(Path::new("net.graphml")));
        assert!(is_graphml(Path::new("net.XML")));
        assert!(!is_graphml(Path::new("net.json")));
        assert!(!is_graphml(Path::new("net")));
    }

    #[test]
    fn test_default_params_drop_family() {
        let value = default_params(&Algorithm::Spring).unwrap();
        assert_eq!(value["iterations"], json!(50));
        assert!(value.get("family").is_none());
        assert_eq!(default_params(&Algorithm::KamadaKawai).unwrap(), json!({}));
    }
}
