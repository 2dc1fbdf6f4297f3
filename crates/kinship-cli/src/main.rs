//! Kinship CLI - build contact graphs and query them
//!
//! `kinship bench` reproduces the memory experiment: build graphs of
//! growing size, sample allocator counters after each build and time the
//! three queries. The other commands run a single query.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use kinship_graph::EdgeStrategy;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod memory;

use config::{BenchConfig, Overrides};
use memory::CountingAlloc;

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

#[derive(Parser)]
#[command(name = "kinship")]
#[command(author = "Kinship Contributors")]
#[command(version)]
#[command(about = "Contact graph lookups and suggestions at scale", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./kinship.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Graph parameters shared by every command that builds a graph.
#[derive(Args, Debug, Default)]
struct GraphArgs {
    /// Number of nodes
    #[arg(short, long)]
    nodes: Option<usize>,

    /// Mean out-degree per node
    #[arg(short, long)]
    mean_degree: Option<usize>,

    /// Random seed for reproducible graphs
    #[arg(long)]
    seed: Option<u64>,

    /// Edge storage: linked or flat
    #[arg(long)]
    strategy: Option<EdgeStrategy>,
}

impl From<&GraphArgs> for Overrides {
    fn from(args: &GraphArgs) -> Self {
        Self {
            nodes: args.nodes,
            mean_degree: args.mean_degree,
            seed: args.seed,
            strategy: args.strategy,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default kinship.json
    Init {
        /// Directory to write into (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Build graphs of each configured size and report memory usage
    Bench {
        #[command(flatten)]
        graph: GraphArgs,
    },

    /// List the direct connections of a phone number
    Lookup {
        number: String,

        #[command(flatten)]
        graph: GraphArgs,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List the phone numbers that connect to a phone number
    Rlookup {
        number: String,

        #[command(flatten)]
        graph: GraphArgs,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Suggest people a phone number may know
    Suggest {
        number: String,

        /// Traversal depth
        #[arg(short, long)]
        depth: Option<usize>,

        /// Maximum suggestions to return
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        graph: GraphArgs,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
}

fn load_config(
    path: Option<&std::path::Path>,
    graph: &GraphArgs,
) -> Result<BenchConfig, Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let config = BenchConfig::discover(path, &cwd)?;
    Ok(config.with_overrides(&Overrides::from(graph)))
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Bench { graph } => {
            load_config(config_path, &graph).and_then(|config| commands::bench(&config))
        }
        Commands::Lookup {
            number,
            graph,
            json,
        } => load_config(config_path, &graph)
            .and_then(|config| commands::lookup(&config, &number, false, json)),
        Commands::Rlookup {
            number,
            graph,
            json,
        } => load_config(config_path, &graph)
            .and_then(|config| commands::lookup(&config, &number, true, json)),
        Commands::Suggest {
            number,
            depth,
            limit,
            graph,
            json,
        } => load_config(config_path, &graph).and_then(|mut config| {
            config.depth = depth.unwrap_or(config.depth);
            config.limit = limit.unwrap_or(config.limit);
            commands::suggest(&config, &number, json)
        }),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
