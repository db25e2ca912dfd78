//! Sync command implementation.

use anyhow::{Context, Result};
use quire_core::{sync_notes, Config, SyncSource};
use std::path::Path;

/// Replace the local notes directory with the vault's notes.
///
/// Flags (or `QUIRE_VAULT` / `QUIRE_ASSETS`) take precedence over the
/// `sync` section of the config file.
pub fn sync_vault(config_path: &Path, vault: Option<&Path>, assets: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;

    let vault = vault
        .map(Path::to_path_buf)
        .or_else(|| config.sync_vault())
        .context("No vault folder given; pass --vault, set QUIRE_VAULT, or set sync.vault")?;
    let assets = assets
        .map(Path::to_path_buf)
        .or_else(|| config.sync_assets())
        .unwrap_or_else(|| vault.clone());

    let source = SyncSource { vault, assets };
    let report = sync_notes(&source, &config.notes_dir(), &config.notes.attachments)
        .context("Failed to sync notes")?;

    println!("Copied {} notes, {} assets", report.notes, report.assets);
    for missing in &report.missing {
        println!("  missing asset: {}", missing);
    }

    Ok(())
}
