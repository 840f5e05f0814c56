//! CLI commands for butterfly-chsearch

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::SearchConfig;
use crate::graph::{EdgeId, GraphFile, LoadedGraph, NodeId, RoutingChGraph, NO_EDGE};
use crate::search::{AStarBidirectionEdgeCh, BidirectionalChSearch, ChPath, DijkstraStrategy};
use crate::validate::validate_random_queries;

#[derive(Parser)]
#[command(name = "butterfly-chsearch")]
#[command(about = "Bidirectional edge-based A* on Contraction Hierarchies", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Search configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Shortest path between two nodes
    Route {
        /// Graph file (JSON)
        #[arg(long)]
        graph: PathBuf,

        /// Source node
        #[arg(long)]
        from: NodeId,

        /// Target node
        #[arg(long)]
        to: NodeId,

        /// Original edge the path must start with
        #[arg(long)]
        from_edge: Option<EdgeId>,

        /// Original edge the path must end with
        #[arg(long)]
        to_edge: Option<EdgeId>,

        #[arg(long, value_enum, default_value_t = Algorithm::Astar)]
        algorithm: Algorithm,

        /// Order entries by weight plus estimate
        #[arg(long)]
        heuristic: bool,

        /// Print the path as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare random queries against Dijkstra on the original graph
    Validate {
        /// Graph file (JSON)
        #[arg(long)]
        graph: PathBuf,

        /// Number of random queries
        #[arg(long, default_value = "1000")]
        queries: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Graph and hierarchy statistics
    Info {
        /// Graph file (JSON)
        #[arg(long)]
        graph: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    /// Bidirectional A* with the beeline approximator
    Astar,
    /// Bidirectional Dijkstra
    Dijkstra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Install the global subscriber. `RUST_LOG` wins over the `info` default.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(fmt::layer().with_writer(std::io::stderr)).init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => SearchConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SearchConfig::default(),
        };

        match self.command {
            Commands::Route {
                graph,
                from,
                to,
                from_edge,
                to_edge,
                algorithm,
                heuristic,
                json,
            } => {
                let mut config = config;
                config.use_heuristic_for_node_order |= heuristic;
                let loaded = load_graph(&graph)?;
                let path = route(
                    &loaded,
                    &config,
                    algorithm,
                    from,
                    from_edge.unwrap_or(NO_EDGE),
                    to,
                    to_edge.unwrap_or(NO_EDGE),
                )?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&path)?);
                } else {
                    print_path(&loaded, &path);
                }
                Ok(())
            }
            Commands::Validate {
                graph,
                queries,
                seed,
            } => {
                let loaded = load_graph(&graph)?;
                let start = Instant::now();
                let result = validate_random_queries(
                    &loaded.road,
                    &loaded.weighting,
                    &loaded.ch,
                    &config,
                    queries,
                    seed,
                );
                tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "validation done");
                result.print();
                if !result.is_valid() {
                    bail!("{} of {} queries disagree with Dijkstra", result.incorrect, result.n_tests);
                }
                Ok(())
            }
            Commands::Info { graph } => {
                let loaded = load_graph(&graph)?;
                let stats = loaded.ch.stats();
                println!("Graph: {}", graph.display());
                println!("  Nodes:           {}", stats.n_nodes);
                println!("  Original edges:  {}", stats.n_original_edges);
                println!("  Turn costs:      {}", loaded.weighting.turn_cost_count());
                println!("  U-turn cost:     {}", loaded.weighting.u_turn_cost());
                println!("  Shortcuts:       {}", stats.n_shortcuts);
                println!("  Up edges:        {}", stats.n_up_edges);
                println!("  Down edges:      {}", stats.n_down_edges);
                println!("  Max level:       {}", stats.max_level);
                Ok(())
            }
        }
    }
}

fn load_graph(path: &Path) -> Result<LoadedGraph> {
    let start = Instant::now();
    let file = GraphFile::load(path).with_context(|| format!("reading graph {}", path.display()))?;
    let loaded = file
        .build()
        .with_context(|| format!("building graph {}", path.display()))?;
    tracing::info!(
        nodes = loaded.ch.node_count(),
        edges = loaded.ch.original_edge_count(),
        shortcuts = loaded.ch.stats().n_shortcuts,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "graph loaded"
    );
    Ok(loaded)
}

/// Run one query with the selected algorithm
pub fn route(
    loaded: &LoadedGraph,
    config: &SearchConfig,
    algorithm: Algorithm,
    from: NodeId,
    from_edge: EdgeId,
    to: NodeId,
    to_edge: EdgeId,
) -> Result<ChPath> {
    let start = Instant::now();
    let path = match algorithm {
        Algorithm::Astar => {
            AStarBidirectionEdgeCh::with_config(&loaded.ch, &loaded.weighting, config)
                .calc_path_edge_to_edge(from, from_edge, to, to_edge)?
        }
        Algorithm::Dijkstra => {
            BidirectionalChSearch::new(&loaded.ch, &loaded.weighting, DijkstraStrategy)
                .with_limits(config.limits())
                .calc_path_edge_to_edge(from, from_edge, to, to_edge)?
        }
    };
    tracing::info!(
        ?algorithm,
        from,
        to,
        found = path.found,
        visited = path.visited_nodes(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "route computed"
    );
    Ok(path)
}

fn print_path(loaded: &LoadedGraph, path: &ChPath) {
    if !path.found {
        println!("No path from {} to {}", path.from, path.to);
        return;
    }
    println!("Route {} → {}", path.from, path.to);
    println!("  Weight:          {:.3}", path.weight);
    println!("  Distance:        {:.1} m", path.distance(&loaded.ch));
    println!("  Edges:           {} ({} in hierarchy)", path.edges.len(), path.ch_edges.len());
    println!("  Visited:         {} fwd, {} bwd", path.visited_fwd, path.visited_bwd);
    println!("  Nodes:           {:?}", path.nodes);
}
