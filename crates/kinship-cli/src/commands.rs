//! CLI command implementations.

use crate::config::{BenchConfig, CONFIG_FILE};
use crate::memory::{self, to_mib};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use kinship_graph::{
    EdgeIndex, EdgeStrategy, FlatEdges, GraphBuilder, LinkedEdges, NodeId, SocialGraph,
    Suggestion,
};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Node count the last memory sample is projected to.
const PROJECTED_NODES: usize = 100_000_000;

/// Neighbors printed per bench query before the rest is elided.
const PREVIEW: usize = 10;

/// Write a default config file into a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_path = path.join(CONFIG_FILE);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(path)?;
    BenchConfig::default().save(&config_path)?;

    println!("{} Wrote {}", "✓".green(), config_path.display());
    println!("  Run {} to build and measure graphs", "kinship bench".cyan());

    Ok(())
}

/// Build every configured graph size, report memory and time queries.
pub fn bench(config: &BenchConfig) -> Result<()> {
    match config.strategy {
        EdgeStrategy::Linked => bench_with::<LinkedEdges>(config),
        EdgeStrategy::Flat => bench_with::<FlatEdges>(config),
    }
}

/// Direct or reverse connections of one phone number.
pub fn lookup(config: &BenchConfig, number: &str, reverse: bool, json: bool) -> Result<()> {
    match config.strategy {
        EdgeStrategy::Linked => lookup_with::<LinkedEdges>(config, number, reverse, json),
        EdgeStrategy::Flat => lookup_with::<FlatEdges>(config, number, reverse, json),
    }
}

/// Ranked contact suggestions for one phone number.
pub fn suggest(config: &BenchConfig, number: &str, json: bool) -> Result<()> {
    match config.strategy {
        EdgeStrategy::Linked => suggest_with::<LinkedEdges>(config, number, json),
        EdgeStrategy::Flat => suggest_with::<FlatEdges>(config, number, json),
    }
}

fn build_graph<E: EdgeIndex>(config: &BenchConfig, nodes: usize) -> Result<SocialGraph<E>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!(
        "Building {} graph with {} nodes...",
        E::STRATEGY,
        nodes
    ));

    let result = GraphBuilder::new(nodes, config.mean_degree)
        .prefix(config.prefix.as_str())
        .maybe_seed(config.seed)
        .build::<E>();

    spinner.finish_and_clear();
    Ok(result?)
}

fn bench_with<E: EdgeIndex>(config: &BenchConfig) -> Result<()> {
    println!(
        "{} {} strategy, mean degree {}",
        "Benchmarking".cyan(),
        E::STRATEGY,
        config.mean_degree
    );

    let query_phase = config.sizes.len() / 2;
    let mut last_sample = None;

    for (phase, &size) in config.sizes.iter().enumerate() {
        // The previous phase's graph is dropped at the end of each iteration
        let start = Instant::now();
        let graph = build_graph::<E>(config, size)?;
        let elapsed = start.elapsed();

        let mem = memory::snapshot();
        let stats = graph.stats();

        println!(
            "{} Built {} nodes, {} edges in {}ms",
            "✓".green(),
            stats.node_count.to_string().cyan(),
            stats.edge_count.to_string().cyan(),
            elapsed.as_millis()
        );
        println!("  {}", mem);
        println!(
            "  {} nodes {} MiB, edges {} MiB, mean degree {:.2}",
            "Graph:".dimmed(),
            to_mib(stats.node_bytes as u64),
            to_mib(stats.edge_bytes as u64),
            stats.mean_degree()
        );

        if phase == query_phase {
            run_queries(&graph, config);
        }

        last_sample = Some((size, mem));
    }

    if let Some((size, mem)) = last_sample {
        println!(
            "Memory usage of a {}-node graph should be ~{} MiB",
            PROJECTED_NODES,
            mem.extrapolate_mib(size, PROJECTED_NODES)
        );
    }

    Ok(())
}

fn run_queries<E: EdgeIndex>(graph: &SocialGraph<E>, config: &BenchConfig) {
    let number = match graph.nodes().iter().next() {
        Some((_, number)) => number.as_str(),
        None => {
            println!("  {}", "Graph is empty, skipping queries".yellow());
            return;
        }
    };

    println!("\n{} {}", "Queries for".cyan(), number);

    let start = Instant::now();
    let friends = graph.lookup(number);
    print_nodes(graph, "lookup", &friends, start.elapsed(), PREVIEW);

    let start = Instant::now();
    let followers = graph.reverse_lookup(number);
    print_nodes(graph, "rlookup", &followers, start.elapsed(), PREVIEW);

    let start = Instant::now();
    let suggestions = graph.suggest_with_limit(number, config.depth, config.limit);
    print_suggestions(graph, &suggestions, start.elapsed());
    println!();
}

fn lookup_with<E: EdgeIndex>(
    config: &BenchConfig,
    number: &str,
    reverse: bool,
    json: bool,
) -> Result<()> {
    let graph = build_graph::<E>(config, config.query_nodes)?;

    let start = Instant::now();
    let nodes = if reverse {
        graph.reverse_lookup(number)
    } else {
        graph.lookup(number)
    };
    let elapsed = start.elapsed();

    if json {
        let direction = if reverse { "reverse" } else { "forward" };
        let output = serde_json::json!({
            "number": number,
            "direction": direction,
            "count": nodes.len(),
            "results": graph.phone_numbers(&nodes),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if nodes.is_empty() {
        println!("No connections found for \"{}\"", number);
        return Ok(());
    }

    let label = if reverse { "rlookup" } else { "lookup" };
    print_nodes(&graph, label, &nodes, elapsed, usize::MAX);
    Ok(())
}

fn suggest_with<E: EdgeIndex>(config: &BenchConfig, number: &str, json: bool) -> Result<()> {
    let graph = build_graph::<E>(config, config.query_nodes)?;

    let start = Instant::now();
    let suggestions = graph.suggest_with_limit(number, config.depth, config.limit);
    let elapsed = start.elapsed();

    if json {
        let results: Vec<_> = suggestions
            .iter()
            .map(|s| {
                serde_json::json!({
                    "number": graph.phone_number(s.node),
                    "score": s.score,
                })
            })
            .collect();
        let output = serde_json::json!({
            "number": number,
            "depth": config.depth,
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("No suggestions for \"{}\"", number);
        return Ok(());
    }

    print_suggestions(&graph, &suggestions, elapsed);
    Ok(())
}

fn print_nodes<E: EdgeIndex>(
    graph: &SocialGraph<E>,
    label: &str,
    nodes: &[NodeId],
    elapsed: Duration,
    max: usize,
) {
    println!(
        "  {} {} results in {}µs",
        label.yellow(),
        nodes.len(),
        elapsed.as_micros()
    );
    for node in nodes.iter().take(max) {
        println!("    {}", graph.phone_number(*node));
    }
    if nodes.len() > max {
        println!("    ... and {} more", nodes.len() - max);
    }
}

fn print_suggestions<E: EdgeIndex>(
    graph: &SocialGraph<E>,
    suggestions: &[Suggestion],
    elapsed: Duration,
) {
    println!(
        "  {} {} results in {}µs",
        "suggest".yellow(),
        suggestions.len(),
        elapsed.as_micros()
    );
    for suggestion in suggestions {
        println!(
            "    {} {}",
            graph.phone_number(suggestion.node).as_str().cyan(),
            format!("{:.3}", suggestion.score).dimmed()
        );
    }
}
