//! Configuration parsing and management.
//!
//! Every field has a default, so a project without `quire.yml` builds with
//! the conventional `pages/`, `notes/`, `data/`, `public/` → `dist/` layout.

use crate::markdown::MarkdownOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the quire.yml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub notes: NotesConfig,
    pub markdown: MarkdownOptions,
    pub sync: SyncConfig,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub pages: PathBuf,
    /// Layout directory; `None` means layouts live among the pages
    pub templates: Option<PathBuf>,
    pub notes: PathBuf,
    pub data: PathBuf,
    pub public: PathBuf,
    /// Stylesheets, copied to `<output>/styles`
    pub styles: PathBuf,
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pages: PathBuf::from("pages"),
            templates: None,
            notes: PathBuf::from("notes"),
            data: PathBuf::from("data"),
            public: PathBuf::from("public"),
            styles: PathBuf::from("styles"),
            output: PathBuf::from("dist"),
        }
    }
}

/// How the `published` frontmatter flag gates notes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishPolicy {
    /// Every note is emitted
    All,
    /// Skip notes whose `published` is present and not `true`
    #[default]
    SkipUnpublished,
    /// Only notes with `published: true` are emitted
    Require,
}

impl PublishPolicy {
    /// Whether a note with this `published` value should be emitted
    pub fn allows(self, published: Option<&str>) -> bool {
        match self {
            PublishPolicy::All => true,
            PublishPolicy::SkipUnpublished => published.map_or(true, |p| p == "true"),
            PublishPolicy::Require => published == Some("true"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    pub publish: PublishPolicy,
    /// Template rendered into `notes/index.html`
    pub listing_template: String,
    /// Attachments folder inside the notes directory
    pub attachments: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            publish: PublishPolicy::default(),
            listing_template: String::from("notes-listing"),
            attachments: String::from("attachments"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Vault folder holding the published markdown notes
    pub vault: Option<PathBuf>,
    /// Folder holding embedded images (defaults to the vault)
    pub assets: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load `path` if it exists, otherwise defaults rooted next to it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }
        tracing::debug!("No config at {:?}; using defaults", path);
        Ok(Self {
            config_path: Some(path.to_path_buf()),
            ..Self::default()
        })
    }

    /// Defaults with every path resolved against `root`
    pub fn with_root(root: &Path) -> Self {
        Self {
            config_path: Some(root.join("quire.yml")),
            ..Self::default()
        }
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.pages)
    }

    /// Layout directory; the pages directory unless configured
    pub fn templates_dir(&self) -> PathBuf {
        match &self.paths.templates {
            Some(dir) => self.resolve_path(dir),
            None => self.pages_dir(),
        }
    }

    /// Whether layouts are mixed in with pages and need the `_` marker
    pub fn templates_share_pages(&self) -> bool {
        self.templates_dir() == self.pages_dir()
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.notes)
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.notes_dir().join(&self.notes.attachments)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.data)
    }

    pub fn public_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.public)
    }

    pub fn styles_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.styles)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    pub fn sync_vault(&self) -> Option<PathBuf> {
        self.sync.vault.as_ref().map(|p| self.resolve_path(p))
    }

    /// Configured sync asset folder; callers fall back to the vault
    pub fn sync_assets(&self) -> Option<PathBuf> {
        self.sync.assets.as_ref().map(|p| self.resolve_path(p))
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(parent) = self.config_path.as_deref().and_then(Path::parent) {
            parent.join(path)
        } else {
            path.to_path_buf()
        }
    }
}
