//! Markdown rendering behind a pluggable trait.

pub mod autolinks;

use pulldown_cmark::{html, Event, Options, Parser};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use autolinks::AutolinkTransformer;

#[derive(Error, Debug)]
pub enum MarkdownError {
    #[error("Markdown rendering failed: {0}")]
    Render(String),
}

/// Renderer switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Link bare URLs
    pub autolinks: bool,
    /// Pass raw HTML through instead of escaping it
    pub html: bool,
    /// Smart quotes and dashes
    pub typographer: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            autolinks: true,
            html: true,
            typographer: true,
        }
    }
}

/// Anything that can turn markdown into HTML
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, MarkdownError>;
}

/// Markdown processor backed by pulldown-cmark
pub struct MarkdownProcessor {
    options: Options,
    settings: MarkdownOptions,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        Self::with_options(MarkdownOptions::default())
    }

    pub fn with_options(settings: MarkdownOptions) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        if settings.typographer {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }

        Self { options, settings }
    }

    /// Convert markdown to HTML
    pub fn convert(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut events: Vec<Event> = parser.collect();

        if !self.settings.html {
            events = events.into_iter().map(escape_raw_html).collect();
        }

        if self.settings.autolinks {
            events = AutolinkTransformer::new().transform(events);
        }

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for MarkdownProcessor {
    fn render(&self, markdown: &str) -> Result<String, MarkdownError> {
        Ok(self.convert(markdown))
    }
}

/// Turn raw HTML into text so the writer escapes it.
fn escape_raw_html(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        other => other,
    }
}
