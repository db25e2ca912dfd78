//! Site building logic - orchestrates discovery, rendering, and output.

use crate::{
    config::Config,
    data::{DataError, GlobalData},
    markdown::{MarkdownError, MarkdownProcessor, MarkdownRenderer},
    models::{Document, NoteSummary, OutputArtifact, RenderedNote},
    notes::{render_listing, render_note},
    paths::MARKDOWN_EXTENSION,
    pipeline::{render_page, RenderEnv},
    templates::{TemplateError, TemplateStore, TEMPLATE_MARKER},
};
use chrono::Datelike;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to {action} {path:?}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to scan source files: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Failed to render {path:?}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: MarkdownError,
    },

    #[error("Refusing to clear output directory {0:?}: it contains site sources")]
    UnsafeOutput(PathBuf),
}

impl BuildError {
    fn io(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> BuildError {
        let path = path.to_path_buf();
        move |source| BuildError::Io {
            action,
            path,
            source,
        }
    }
}

/// Summary of one finished build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub notes: usize,
    /// Whether `notes/index.html` was written
    pub listing: bool,
    pub elapsed: Duration,
}

/// Main site builder
///
/// A build clears the output directory and regenerates everything. Calls to
/// [`SiteBuilder::build`] on one builder never overlap.
pub struct SiteBuilder {
    config: Config,
    markdown: Box<dyn MarkdownRenderer>,
    build_lock: Mutex<()>,
}

impl SiteBuilder {
    pub fn new(config: Config) -> Self {
        let markdown = Box::new(MarkdownProcessor::with_options(config.markdown));
        Self::with_renderer(config, markdown)
    }

    /// Use a custom markdown renderer instead of pulldown-cmark
    pub fn with_renderer(config: Config, markdown: Box<dyn MarkdownRenderer>) -> Self {
        Self {
            config,
            markdown,
            build_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the entire site
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let _guard = self.build_lock.lock();
        let start = Instant::now();
        let output_dir = self.config.output_dir();

        tracing::info!("Building site into {:?}", output_dir);

        self.reset_output_dir(&output_dir)?;

        let templates = TemplateStore::load(
            &self.config.templates_dir(),
            self.config.templates_share_pages(),
        )?;
        let data = GlobalData::load(&self.config.data_dir())?;
        tracing::debug!("Loaded {} templates, {} data sets", templates.len(), data.len());

        let env = RenderEnv {
            templates: &templates,
            data: &data,
            markdown: self.markdown.as_ref(),
            year: chrono::Local::now().year(),
        };

        let pages = self.render_pages(&env)?;
        let notes = self.render_notes(&env)?;

        // The listing needs every note's summary, so it runs last
        let summaries: Vec<NoteSummary> = notes.iter().map(|n| n.summary.clone()).collect();
        let listing = if self.config.notes_dir().is_dir() {
            render_listing(&summaries, &env, &self.config.notes.listing_template)
        } else {
            None
        };

        for artifact in pages
            .iter()
            .chain(notes.iter().map(|n| &n.artifact))
            .chain(listing.iter())
        {
            write_artifact(&output_dir, artifact)?;
        }

        let attachments = self.config.attachments_dir();
        if attachments.is_dir() {
            let dest = output_dir.join("notes").join(&self.config.notes.attachments);
            copy_dir(&attachments, &dest)?;
        }

        let public = self.config.public_dir();
        if public.is_dir() {
            copy_dir(&public, &output_dir)?;
        }

        let styles = self.config.styles_dir();
        if styles.is_dir() {
            copy_dir(&styles, &output_dir.join("styles"))?;
        }

        let report = BuildReport {
            pages: pages.len(),
            notes: notes.len(),
            listing: listing.is_some(),
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Built {} pages and {} notes in {}ms",
            report.pages,
            report.notes,
            report.elapsed.as_millis()
        );

        Ok(report)
    }

    /// Render every page under the pages directory
    pub fn render_pages(&self, env: &RenderEnv<'_>) -> Result<Vec<OutputArtifact>, BuildError> {
        let pages_dir = self.config.pages_dir();
        let sources = discover_pages(&pages_dir)?;
        tracing::info!("Found {} pages", sources.len());

        sources
            .par_iter()
            .map(|rel| -> Result<OutputArtifact, BuildError> {
                let doc = read_document(&pages_dir, rel)?;
                let artifact = render_page(&doc, env).map_err(|source| BuildError::Render {
                    path: pages_dir.join(rel),
                    source,
                })?;
                tracing::debug!("Rendered page {:?} -> {:?}", rel, artifact.dest);
                Ok(artifact)
            })
            .collect()
    }

    /// Render every published note in the notes directory
    pub fn render_notes(&self, env: &RenderEnv<'_>) -> Result<Vec<RenderedNote>, BuildError> {
        let notes_dir = self.config.notes_dir();
        let sources = discover_notes(&notes_dir)?;
        tracing::info!("Found {} notes", sources.len());

        let rendered: Vec<Option<RenderedNote>> = sources
            .par_iter()
            .map(|rel| -> Result<Option<RenderedNote>, BuildError> {
                let doc = read_document(&notes_dir, rel)?;
                render_note(&doc, env, &self.config.notes).map_err(|source| BuildError::Render {
                    path: notes_dir.join(rel),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(rendered.into_iter().flatten().collect())
    }

    fn reset_output_dir(&self, output_dir: &Path) -> Result<(), BuildError> {
        let sources = [
            self.config.pages_dir(),
            self.config.notes_dir(),
            self.config.templates_dir(),
            self.config.data_dir(),
            self.config.public_dir(),
            self.config.styles_dir(),
        ];
        if sources.iter().any(|src| src.starts_with(output_dir)) {
            return Err(BuildError::UnsafeOutput(output_dir.to_path_buf()));
        }

        if output_dir.exists() {
            fs::remove_dir_all(output_dir).map_err(BuildError::io("remove", output_dir))?;
        }
        fs::create_dir_all(output_dir).map_err(BuildError::io("create", output_dir))?;
        Ok(())
    }
}

fn read_document(root: &Path, rel: &Path) -> Result<Document, BuildError> {
    Document::read(root, rel).map_err(BuildError::io("read", &root.join(rel)))
}

/// Page sources (`.md`, `.html`) relative to `pages_dir`, sorted.
///
/// Anything whose name starts with the template marker is skipped, including
/// whole directories.
fn discover_pages(pages_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    if !pages_dir.is_dir() {
        tracing::info!("Pages directory {:?} not found", pages_dir);
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(pages_dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_marked(e.file_name()));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), &[MARKDOWN_EXTENSION, "html"]) {
            continue;
        }
        let rel = entry.path().strip_prefix(pages_dir).unwrap_or(entry.path());
        files.push(rel.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Markdown files directly inside `notes_dir`, sorted
fn discover_notes(notes_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    if !notes_dir.is_dir() {
        tracing::info!("Notes directory {:?} not found", notes_dir);
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(notes_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), &[MARKDOWN_EXTENSION]) {
            files.push(PathBuf::from(entry.file_name()));
        }
    }

    files.sort();
    Ok(files)
}

fn is_marked(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with(TEMPLATE_MARKER))
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

fn write_artifact(output_dir: &Path, artifact: &OutputArtifact) -> Result<(), BuildError> {
    let target = output_dir.join(&artifact.dest);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(BuildError::io("create", parent))?;
    }
    fs::write(&target, &artifact.html).map_err(BuildError::io("write", &target))?;
    Ok(())
}

/// Copy every file under `src` into `dest`, overwriting existing files
fn copy_dir(src: &Path, dest: &Path) -> Result<(), BuildError> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(BuildError::io("create", parent))?;
        }
        fs::copy(entry.path(), &target).map_err(BuildError::io("copy", entry.path()))?;
    }
    Ok(())
}
