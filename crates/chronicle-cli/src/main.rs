//! Chronicle CLI - Command-line interface for Chronicle
//!
//! Loads a timeline dataset (or the bundled sample) and runs one query
//! against it per invocation.

use chronicle_core::{Dimension, TimelineDate};
use chronicle_graph::ImportanceWeights;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "chronicle")]
#[command(author = "Chronicle Contributors")]
#[command(version)]
#[command(about = "Query a branching timeline of events", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Dataset to load (defaults to the bundled sample timeline)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show node, connection and branch counts
    Stats {
        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List branches and their members
    Branches {
        #[arg(long)]
        json: bool,
    },

    /// Show a single node
    Show {
        /// Node id
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Filter nodes by thematic thresholds, branch and date
    Filter {
        /// Minimum score for a dimension, e.g. `technical=7` (repeatable)
        #[arg(short = 't', long = "threshold", value_parser = parse_threshold)]
        thresholds: Vec<(Dimension, u8)>,

        /// Include nodes on speculative branches
        #[arg(long)]
        all_branches: bool,

        /// Earliest date (inclusive)
        #[arg(long)]
        from: Option<TimelineDate>,

        /// Latest date (inclusive)
        #[arg(long)]
        to: Option<TimelineDate>,

        #[arg(long)]
        json: bool,
    },

    /// Search titles and descriptions
    Search {
        /// Search term (case-insensitive substring)
        term: String,

        /// Maximum results to return
        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Find the shortest chain of connections between two nodes
    Path {
        from: String,
        to: String,

        #[arg(long)]
        json: bool,
    },

    /// List every node reachable from a node
    Reachable {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Score a node's importance
    Importance {
        id: String,

        #[command(flatten)]
        weights: WeightArgs,

        #[arg(long)]
        json: bool,
    },

    /// Rank nodes by importance
    Rank {
        /// Number of nodes to show (0 = all)
        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[command(flatten)]
        weights: WeightArgs,

        #[arg(long)]
        json: bool,
    },

    /// Export the loaded timeline as a dataset document
    Export {
        /// Output file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Importance formula weights.
#[derive(Args, Debug, Clone, Copy)]
struct WeightArgs {
    /// Weight per outgoing connection
    #[arg(long, default_value = "2.0")]
    out_weight: f64,

    /// Weight per incoming connection
    #[arg(long, default_value = "3.0")]
    in_weight: f64,

    /// Weight per thematic score point
    #[arg(long, default_value = "0.5")]
    theme_weight: f64,
}

impl From<WeightArgs> for ImportanceWeights {
    fn from(args: WeightArgs) -> Self {
        ImportanceWeights {
            out_degree: args.out_weight,
            in_degree: args.in_weight,
            thematic: args.theme_weight,
        }
    }
}

/// Parses `dimension=min`.
fn parse_threshold(s: &str) -> Result<(Dimension, u8), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected DIMENSION=MIN, got '{}'", s))?;
    let dimension: Dimension = name.parse().map_err(|e| format!("{}", e))?;
    let min: u8 = value
        .trim()
        .parse()
        .map_err(|_| format!("threshold '{}' is not a number", value))?;
    if min > 10 {
        return Err(format!("threshold {} is outside 0..=10", min));
    }
    Ok((dimension, min))
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

    let result = commands::load_graph(cli.data.as_deref()).and_then(|graph| {
        match cli.command {
            Commands::Stats { json } => commands::stats(&graph, json),
            Commands::Branches { json } => commands::branches(&graph, json),
            Commands::Show { id, json } => commands::show(&graph, &id, json),
            Commands::Filter {
                thresholds,
                all_branches,
                from,
                to,
                json,
            } => {
                let criteria = commands::build_criteria(&thresholds, all_branches, from, to);
                commands::filter(&graph, &criteria, json)
            }
            Commands::Search { term, limit, json } => {
                commands::search(&graph, &term, limit, json)
            }
            Commands::Path { from, to, json } => commands::path(&graph, &from, &to, json),
            Commands::Reachable { id, json } => commands::reachable(&graph, &id, json),
            Commands::Importance { id, weights, json } => {
                commands::importance(&graph, &id, &weights.into(), json)
            }
            Commands::Rank {
                limit,
                weights,
                json,
            } => commands::rank(&graph, limit, &weights.into(), json),
            Commands::Export { output } => commands::export(&graph, output.as_deref()),
        }
    });

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
