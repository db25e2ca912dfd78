//! # quire-core
//!
//! Core library for the quire static site generator.
//!
//! Pages and notes are markdown or HTML files with a flat `---` frontmatter
//! block. They are rendered through layouts with `{{name}}` placeholders into
//! an output tree that is rebuilt from scratch on every build.

pub mod builder;
pub mod config;
pub mod data;
pub mod frontmatter;
pub mod markdown;
pub mod models;
pub mod notes;
pub mod paths;
pub mod pipeline;
pub mod slug;
pub mod sync;
pub mod templates;

pub use builder::{BuildError, BuildReport, SiteBuilder};
pub use config::{Config, PublishPolicy};
pub use data::GlobalData;
pub use markdown::{MarkdownOptions, MarkdownProcessor, MarkdownRenderer};
pub use models::{Document, Frontmatter, NoteSummary, OutputArtifact};
pub use slug::slugify;
pub use sync::{sync_notes, SyncReport, SyncSource};
pub use templates::{RenderContext, TemplateStore};
