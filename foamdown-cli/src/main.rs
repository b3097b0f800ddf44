//! # foamdown CLI
//!
//! Command-line interface for rendering and resolving notes of a foamdown
//! workspace.

mod commands;
mod loader;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "foamdown")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults to ./foamdown.yml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a note to HTML on stdout
    Render {
        /// Note identifier (`note-a`, `path/to/note-a`, `/abs/path.md`)
        identifier: String,

        /// Wrap embedded notes in a container div
        #[arg(long, conflicts_with = "flat")]
        container: bool,

        /// Insert embedded notes without a container
        #[arg(long)]
        flat: bool,
    },

    /// Show which resource an identifier resolves to
    Resolve {
        /// Identifier as written inside `[[...]]`
        identifier: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List every resource of the workspace
    List {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout carries command output
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::WARN.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Render {
            identifier,
            container,
            flat,
        } => {
            let mode = match (container, flat) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            commands::render_note(config, &identifier, mode)
        }
        Commands::Resolve { identifier, json } => {
            commands::resolve_identifier(config, &identifier, json)
        }
        Commands::List { json } => commands::list_resources(config, json),
    }
}
