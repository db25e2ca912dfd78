//! # quire CLI
//!
//! Command-line interface for the quire static site generator.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (optional; defaults apply when missing)
    #[arg(long, default_value = "quire.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site
    Build,

    /// Copy notes and their embedded images from a vault folder
    Sync {
        /// Vault folder holding the notes to publish
        #[arg(long, env = "QUIRE_VAULT")]
        vault: Option<PathBuf>,

        /// Folder holding embedded images (defaults to the vault)
        #[arg(long, env = "QUIRE_ASSETS")]
        assets: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Build => commands::build_site(&cli.config),
        Commands::Sync { vault, assets } => {
            commands::sync_vault(&cli.config, vault.as_deref(), assets.as_deref())
        }
    }
}
