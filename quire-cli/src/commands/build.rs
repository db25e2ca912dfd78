//! Build command implementation.

use anyhow::{Context, Result};
use quire_core::{Config, SiteBuilder};
use std::path::Path;

/// Build the static site into the configured output directory
pub fn build_site(config_path: &Path) -> Result<()> {
    tracing::info!("Loading config from {:?}", config_path);
    let config = Config::load(config_path).context("Failed to load configuration")?;
    let output_dir = config.output_dir();

    let builder = SiteBuilder::new(config);
    let report = builder.build().context("Failed to build site")?;

    tracing::info!("✓ Built {} pages, {} notes", report.pages, report.notes);
    if report.listing {
        tracing::info!("✓ Wrote notes listing");
    }
    tracing::info!("✓ Output written to {:?}", output_dir);

    Ok(())
}
