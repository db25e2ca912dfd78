//! Output path derivation for pages and notes.

use std::path::{Component, Path, PathBuf};

/// Extension that turns a page into a pretty-URL directory
pub const MARKDOWN_EXTENSION: &str = "md";

/// Destination of a page relative to the output root.
///
/// Priority:
/// 1. `permalink` ending in `/` → `<permalink>index.html`
/// 2. any other `permalink` → the permalink as a file path
/// 3. markdown source → `<path without .md>/index.html`
/// 4. otherwise the source path unchanged
///
/// Leading slashes and `.`/`..` segments are dropped so the result always
/// stays inside the output root.
///
/// ```
/// use quire_core::paths::page_output_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(page_output_path(Path::new("about.md"), None), PathBuf::from("about/index.html"));
/// assert_eq!(page_output_path(Path::new("x.md"), Some("/custom/")), PathBuf::from("custom/index.html"));
/// ```
pub fn page_output_path(rel_source: &Path, permalink: Option<&str>) -> PathBuf {
    if let Some(permalink) = permalink.filter(|p| !p.is_empty()) {
        return if permalink.ends_with('/') {
            sanitize(Path::new(permalink)).join("index.html")
        } else {
            sanitize(Path::new(permalink))
        };
    }

    let is_markdown = rel_source
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(MARKDOWN_EXTENSION));

    if is_markdown {
        sanitize(&rel_source.with_extension("")).join("index.html")
    } else {
        sanitize(rel_source)
    }
}

/// Destination of a note: always `notes/<slug>/index.html`
pub fn note_output_path(slug: &str) -> PathBuf {
    Path::new("notes").join(sanitize(Path::new(slug))).join("index.html")
}

/// Keep only normal components of `path`.
fn sanitize(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}
