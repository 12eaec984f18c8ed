//! Objscope CLI - Inspect live-object heaps from the terminal
//!
//! # Commands
//!
//! - `objscope dump` - Load a JSON heap, expand paths and print the shown tree
//! - `objscope pages` - Print the page layout of a list of a given length
//! - `objscope config` - Show the effective configuration and its location
//!
//! # Usage
//!
//! ```bash
//! # Print the roots of a heap
//! objscope dump heap.json
//!
//! # Open a struct and a nested list, then go to the list's third page
//! objscope dump heap.json --expand player --expand player.items --page player.items=3
//!
//! # Same tree as JSON, ten rows per page
//! objscope dump heap.json --expand player.items --page-limit 10 --json
//! ```
//!
//! Set `RUST_LOG=debug` to trace walks and refreshes.

mod config;
mod dump;
mod pages;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Objscope CLI - Inspect live-object heaps from the terminal
#[derive(Parser)]
#[command(name = "objscope")]
#[command(about = "Inspect live-object heaps from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a JSON heap and print the inspector tree
    Dump(dump::DumpArgs),

    /// Print the page layout for a list length
    Pages(pages::PagesArgs),

    /// Show the effective configuration
    Config(config::ConfigArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dump(args) => dump::execute(args),
        Commands::Pages(args) => pages::execute(args),
        Commands::Config(args) => config::execute(args),
    }
}
