//! mengine CLI - resource and guest inspection tool
//!
//! # Commands
//!
//! - `mengine load` - Load every resource listed in a manifest and report the result
//! - `mengine read-str` - Print the C string returned by a guest export
//!
//! # Usage
//!
//! ```bash
//! # Load resources.toml, resolving paths next to the manifest
//! mengine load resources.toml
//!
//! # Load from a CDN instead of disk
//! mengine load resources.toml --base-url https://cdn.example.com/spaceout
//!
//! # Call `game_title() -> i32` in a guest and print the string it returns
//! mengine read-str spaceout.wasm game_title
//! ```

mod load;
mod read_str;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// mengine CLI - resource and guest inspection tool
#[derive(Parser)]
#[command(name = "mengine")]
#[command(about = "Load mengine game resources and inspect guest modules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every resource listed in a manifest
    Load(load::LoadArgs),

    /// Print the C string returned by a guest export
    ReadStr(read_str::ReadStrArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Load(args) => load::execute(args),
        Commands::ReadStr(args) => read_str::execute(args),
    }
}
