//! VRNetz CLI
//!
//! - `apply`: compute layouts for a VRNetz (or GraphML) network and write the
//!   processed VRNetz file
//! - `algorithms`: list the layout algorithms and their default parameters
//! - `inspect`: summarize a network file

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

mod commands;

#[derive(Parser)]
#[command(name = "vrnetz")]
#[command(author, version, about = "VRNetz: 3D layouts for network visualization")]
struct Cli {
    /// More log output (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layouts and write the processed network.
    Apply(ApplyArgs),

    /// List layout algorithms and their default parameters.
    Algorithms {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Summarize a network file.
    Inspect {
        /// VRNetz JSON or GraphML file
        input: PathBuf,
    },
}

#[derive(Args)]
pub struct ApplyArgs {
    /// VRNetz JSON or GraphML (`.graphml`/`.xml`) input
    pub input: PathBuf,

    /// Output VRNetz file
    #[arg(short, long)]
    pub out: PathBuf,

    /// Layout as `name=algorithm[:key=value,...]` (repeatable)
    #[arg(short, long = "layout", value_name = "SPEC")]
    pub layouts: Vec<String>,

    /// JSON array of `{name, algorithm, params, random}` requests
    #[arg(long, value_name = "FILE")]
    pub requests: Option<PathBuf>,

    /// Feature matrix JSON (`{"<node id>": [f64, ...]}`) for functional layouts
    #[arg(long, value_name = "FILE", conflicts_with = "features_column")]
    pub features: Option<PathBuf>,

    /// Node column holding feature arrays for functional layouts
    #[arg(long, value_name = "COLUMN")]
    pub features_column: Option<String>,

    /// Pipeline configuration JSON
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the base seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the layout dimension (2 or 3)
    #[arg(long)]
    pub dimension: Option<usize>,

    /// Compute layouts concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Use random positions instead of every algorithm
    #[arg(long)]
    pub random: bool,

    /// Write compact instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Apply(args) => commands::cmd_apply(&args),
        Commands::Algorithms { json } => commands::cmd_algorithms(json),
        Commands::Inspect { input } => commands::cmd_inspect(&input),
    }
}
