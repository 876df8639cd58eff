//! CLI command definitions

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

/// Travel-planning workflow runner
#[derive(Parser)]
#[command(
    name = "tg",
    about = "Multi-stage travel itinerary planner",
    version,
    after_help = "Set RUST_LOG to control log verbosity (e.g. RUST_LOG=tripgraph=debug)."
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Plan a trip and print the itinerary
    Plan {
        /// Destination, e.g. "Paris, France"
        destination: String,

        /// First day of the trip (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Day after the last day of the trip (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Total budget for the trip
        #[arg(long)]
        budget: Option<f64>,

        /// Comma-separated interest tags, e.g. "museums,food"
        #[arg(long, value_delimiter = ',')]
        interests: Vec<String>,

        /// Number of travelers
        #[arg(long, default_value_t = 1)]
        travelers: u32,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
