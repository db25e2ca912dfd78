//! Pull published notes and their embedded images out of a local vault.
//!
//! The local notes directory is owned by the sync: it is cleared and filled
//! again on every run, with file names slugified to match what the notes
//! pipeline expects.

use crate::{notes::embed_references, slug::slugify};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Vault folder not found: {0:?}")]
    MissingVault(PathBuf),

    #[error("Refusing to clear notes directory {notes:?}: it contains the sync source {source_dir:?}")]
    SourceInsideNotes { notes: PathBuf, source_dir: PathBuf },

    #[error("Failed to {action} {path:?}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> SyncError {
    let path = path.to_path_buf();
    move |source| SyncError::Io {
        action,
        path,
        source,
    }
}

/// Where to pull notes from and where to put them
#[derive(Debug, Clone)]
pub struct SyncSource {
    /// Folder whose top-level `.md` files are the notes
    pub vault: PathBuf,
    /// Folder that `![[...]]` references resolve against
    pub assets: PathBuf,
}

/// Counts from one sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub notes: usize,
    pub assets: usize,
    /// References with no matching file in the assets folder
    pub missing: Vec<String>,
}

/// Replace `notes_dir` with the vault's notes and the assets they embed.
///
/// Only assets that some note references are copied, each under its
/// slugified name in `notes_dir/<attachments>/`.
pub fn sync_notes(
    source: &SyncSource,
    notes_dir: &Path,
    attachments: &str,
) -> Result<SyncReport, SyncError> {
    if !source.vault.is_dir() {
        return Err(SyncError::MissingVault(source.vault.clone()));
    }

    for source_dir in [&source.vault, &source.assets] {
        if is_within(source_dir, notes_dir) {
            return Err(SyncError::SourceInsideNotes {
                notes: notes_dir.to_path_buf(),
                source_dir: source_dir.clone(),
            });
        }
    }

    tracing::info!("Syncing notes from {:?}", source.vault);

    if notes_dir.exists() {
        fs::remove_dir_all(notes_dir).map_err(io_err("remove", notes_dir))?;
    }
    let attachments_dir = notes_dir.join(attachments);
    fs::create_dir_all(&attachments_dir).map_err(io_err("create", &attachments_dir))?;

    let mut report = SyncReport::default();
    let mut references = BTreeSet::new();

    let mut sources = Vec::new();
    for entry in fs::read_dir(&source.vault).map_err(io_err("read", &source.vault))? {
        let path = entry.map_err(io_err("read", &source.vault))?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "md") {
            sources.push(path);
        }
    }
    sources.sort();

    for path in sources {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let content = fs::read_to_string(&path).map_err(io_err("read", &path))?;
        references.extend(embed_references(&content));

        let target = notes_dir.join(slugify(name));
        fs::write(&target, &content).map_err(io_err("write", &target))?;
        tracing::debug!("Synced note {:?} -> {:?}", path, target);
        report.notes += 1;
    }

    for reference in references {
        let src = source.assets.join(&reference);
        if !src.is_file() {
            tracing::warn!("Asset not found: {}", reference);
            report.missing.push(reference);
            continue;
        }
        let target = attachments_dir.join(slugify(&reference));
        if !target.starts_with(&attachments_dir) || reference.split('/').any(|c| c == "..") {
            tracing::warn!("Asset reference escapes attachments: {}", reference);
            report.missing.push(reference);
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_err("create", parent))?;
        }
        fs::copy(&src, &target).map_err(io_err("copy", &target))?;
        report.assets += 1;
    }

    tracing::info!("Copied {} notes, {} assets", report.notes, report.assets);

    Ok(report)
}

/// Whether `path` is `dir` or lies under it, comparing canonical forms
/// when both exist.
fn is_within(path: &Path, dir: &Path) -> bool {
    let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    path.starts_with(dir)
}
