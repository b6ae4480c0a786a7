//! Quill CLI - Static blog diagram tooling.
//!
//! Provides commands for:
//! - `new`: Scaffold a dated post from a template
//! - `render`: Render a post to HTML with diagram placeholders
//! - `encode` / `decode`: Convert between diagram source and service tokens
//! - `check`: Render every remote diagram in a post against the service
//! - `settings`: Print the page-side diagram settings as JSON

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, DecodeArgs, EncodeArgs, NewArgs, RenderArgs, SettingsArgs};
use output::Output;

/// Quill - Static blog diagram tooling.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output (show INFO level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new post from a template.
    New(NewArgs),
    /// Render a markdown post to HTML.
    Render(RenderArgs),
    /// Encode diagram source into a service token and URL.
    Encode(EncodeArgs),
    /// Decode a service token back into diagram source.
    Decode(DecodeArgs),
    /// Render every remote diagram in a post against the service.
    Check(CheckArgs),
    /// Print page-side diagram settings as JSON.
    Settings(SettingsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::New(args) => args.execute(config),
        Commands::Render(args) => args.execute(config),
        Commands::Encode(args) => args.execute(config),
        Commands::Decode(args) => args.execute(),
        Commands::Check(args) => args.execute(config),
        Commands::Settings(args) => args.execute(config),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
