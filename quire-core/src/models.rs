//! Content model structs for documents, frontmatter and build outputs.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Flat string metadata from a document's leading `---` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frontmatter {
    fields: BTreeMap<String, String>,
}

impl Frontmatter {
    /// Insert a field, replacing any earlier value for the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Like [`Frontmatter::get`], but treats an empty value as unset.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.fields.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Frontmatter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fm = Frontmatter::default();
        for (k, v) in iter {
            fm.insert(k, v);
        }
        fm
    }
}

/// Raw text of one source file
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the collection root (pages or notes directory)
    pub rel_path: PathBuf,
    pub raw: String,
}

impl Document {
    pub fn new(rel_path: impl Into<PathBuf>, raw: impl Into<String>) -> Self {
        Self {
            rel_path: rel_path.into(),
            raw: raw.into(),
        }
    }

    /// Read `root/rel_path` from disk.
    pub fn read(root: &Path, rel_path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(root.join(rel_path))?;
        Ok(Self::new(rel_path, raw))
    }

    /// Lowercased extension without the dot, if any
    pub fn extension(&self) -> Option<String> {
        self.rel_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// File name without its extension
    pub fn stem(&self) -> String {
        self.rel_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// One rendered file destined for the output tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    /// Destination relative to the output root
    pub dest: PathBuf,
    pub html: String,
}

/// Metadata collected from every emitted note for the listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteSummary {
    pub title: String,
    pub slug: String,
    /// Raw frontmatter date, ISO formatted when present
    pub date: String,
}

/// A rendered note plus the summary used by the listing
#[derive(Debug, Clone)]
pub struct RenderedNote {
    pub artifact: OutputArtifact,
    pub summary: NoteSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_skips_blank_values() {
        let fm: Frontmatter = [("layout", ""), ("title", "Home")].into_iter().collect();
        assert_eq!(fm.get("layout"), Some(""));
        assert_eq!(fm.non_empty("layout"), None);
        assert_eq!(fm.non_empty("title"), Some("Home"));
    }

    #[test]
    fn test_document_extension_and_stem() {
        let doc = Document::new("blog/My Post.MD", "");
        assert_eq!(doc.extension().as_deref(), Some("md"));
        assert_eq!(doc.stem(), "My Post");
    }
}
