//! Per-page render pipeline.
//!
//! Flow: Document → frontmatter → markdown (for `.md`) → layout → output path
//!
//! Every input here is read-only, so pages can be rendered from any number of
//! threads at once.

use crate::{
    data::GlobalData,
    frontmatter::parse_frontmatter,
    markdown::{MarkdownError, MarkdownRenderer},
    models::{Document, OutputArtifact},
    paths::{page_output_path, MARKDOWN_EXTENSION},
    templates::{RenderContext, TemplateStore},
};

/// Layout used when a page does not name one
pub const DEFAULT_LAYOUT: &str = "default";

/// Build-scoped inputs shared by every page and note render
pub struct RenderEnv<'a> {
    pub templates: &'a TemplateStore,
    pub data: &'a GlobalData,
    pub markdown: &'a dyn MarkdownRenderer,
    /// Captured once per build so repeated renders agree
    pub year: i32,
}

impl<'a> RenderEnv<'a> {
    /// Context with the given built-ins, then global data, layered in order
    pub fn base_context(&self, builtins: RenderContext) -> RenderContext {
        let mut context = builtins.with("year", self.year);
        context.merge(self.data);
        context
    }

    /// Render `layout` with `context`, or return the bare content when the
    /// layout is not registered.
    pub fn apply_layout(&self, layout: &str, context: &RenderContext, content: String) -> String {
        match self.templates.render(layout, context) {
            Some(html) => html,
            None => {
                tracing::debug!("Layout '{}' not found; emitting content as-is", layout);
                content
            }
        }
    }
}

/// Render one page document into its output artifact
pub fn render_page(doc: &Document, env: &RenderEnv<'_>) -> Result<OutputArtifact, MarkdownError> {
    let (frontmatter, body) = parse_frontmatter(&doc.raw);

    let content = if doc.extension().as_deref() == Some(MARKDOWN_EXTENSION) {
        env.markdown.render(&body)?
    } else {
        body
    };

    let layout = frontmatter.non_empty("layout").unwrap_or(DEFAULT_LAYOUT);

    let mut context = env.base_context(
        RenderContext::new()
            .with("content", content.as_str())
            .with("title", "")
            .with("description", "")
            .with("date", ""),
    );
    context.merge_frontmatter(&frontmatter);

    let html = env.apply_layout(layout, &context, content);
    let dest = page_output_path(&doc.rel_path, frontmatter.non_empty("permalink"));

    Ok(OutputArtifact { dest, html })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::MarkdownProcessor;
    use serde_json::json;
    use std::path::PathBuf;

    fn layouts() -> TemplateStore {
        [
            ("default", "<title>{{title}}</title><main>{{{content}}}</main><footer>{{year}}</footer>"),
            ("bare", "{{{content}}}|{{site}}|{{title}}"),
        ]
        .into_iter()
        .collect()
    }

    fn render(doc: &Document, templates: &TemplateStore, data: &GlobalData) -> OutputArtifact {
        let markdown = MarkdownProcessor::new();
        let env = RenderEnv {
            templates,
            data,
            markdown: &markdown,
            year: 2024,
        };
        render_page(doc, &env).unwrap()
    }

    #[test]
    fn test_markdown_page_uses_default_layout() {
        let doc = Document::new("about.md", "---\ntitle: About <us>\n---\n# Hi\n");
        let out = render(&doc, &layouts(), &GlobalData::default());

        assert_eq!(out.dest, PathBuf::from("about/index.html"));
        assert_eq!(
            out.html,
            "<title>About &lt;us&gt;</title><main><h1>Hi</h1>\n</main><footer>2024</footer>"
        );
    }

    #[test]
    fn test_html_page_is_not_markdown_rendered() {
        let doc = Document::new("contact.html", "<p># not a heading</p>");
        let out = render(&doc, &layouts(), &GlobalData::default());

        assert_eq!(out.dest, PathBuf::from("contact.html"));
        assert!(out.html.contains("<main><p># not a heading</p></main>"));
        assert!(out.html.contains("<title></title>"));
    }

    #[test]
    fn test_missing_layout_emits_content() {
        let doc = Document::new("x.md", "---\nlayout: nope\n---\nplain");
        let out = render(&doc, &layouts(), &GlobalData::default());
        assert_eq!(out.html, "<p>plain</p>\n");
    }

    #[test]
    fn test_frontmatter_overrides_global_data() {
        let mut data = GlobalData::default();
        data.insert("site", json!({"name": "Acme"}));
        data.insert("title", json!("From data"));

        let doc = Document::new("home.html", "---\nlayout: bare\ntitle: Home\n---\nbody");
        let out = render(&doc, &layouts(), &data);
        assert_eq!(out.html, r#"body|{"name":"Acme"}|Home"#);
    }

    #[test]
    fn test_permalink_wins() {
        let doc = Document::new("about.md", "---\npermalink: /custom.html\n---\nx");
        let out = render(&doc, &layouts(), &GlobalData::default());
        assert_eq!(out.dest, PathBuf::from("custom.html"));
    }
}
