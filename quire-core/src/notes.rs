//! Notes collection: publish filtering, image embeds, slugs and the listing page.

use crate::{
    config::NotesConfig,
    frontmatter::parse_frontmatter,
    markdown::MarkdownError,
    models::{Document, NoteSummary, OutputArtifact, RenderedNote},
    paths::note_output_path,
    pipeline::{RenderEnv, DEFAULT_LAYOUT},
    slug::slugify,
    templates::{escape_html, RenderContext},
};
use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Layout tried first for note pages
pub const NOTE_LAYOUT: &str = "note";

static EMBED_REGEX: OnceLock<Regex> = OnceLock::new();

fn embed_regex() -> &'static Regex {
    EMBED_REGEX.get_or_init(|| Regex::new(r"!\[\[([^\]]+)\]\]").unwrap())
}

/// References named by `![[...]]` embeds, without any `|alt` suffix
pub fn embed_references(body: &str) -> Vec<String> {
    embed_regex()
        .captures_iter(body)
        .map(|caps| split_embed(&caps[1]).0.to_string())
        .collect()
}

/// Rewrite `![[Image Name.png]]` to `![](../attachments/image-name.png)`.
///
/// Notes render to `notes/<slug>/index.html` and attachments are copied to
/// `notes/<attachments>/`, so links climb one directory.
pub fn rewrite_embeds(body: &str, attachments: &str) -> String {
    embed_regex()
        .replace_all(body, |caps: &Captures| {
            let (reference, alt) = split_embed(&caps[1]);
            format!("![{}](../{}/{})", alt, attachments, slugify(reference))
        })
        .into_owned()
}

/// `name|alt` → (`name`, `alt`)
fn split_embed(inner: &str) -> (&str, &str) {
    match inner.split_once('|') {
        Some((reference, alt)) => (reference.trim(), alt.trim()),
        None => (inner.trim(), ""),
    }
}

/// Frontmatter `slug`, else the slugified file name
pub fn note_slug(doc: &Document, slug: Option<&str>) -> String {
    match slug {
        Some(slug) => slug.to_string(),
        None => slugify(&doc.stem()),
    }
}

/// `2024-01-02` → `January 2, 2024`; anything else is returned unchanged
pub fn display_date(raw: &str) -> String {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d"));
    match date {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Render one note, or `None` when the publish policy skips it
pub fn render_note(
    doc: &Document,
    env: &RenderEnv<'_>,
    options: &NotesConfig,
) -> Result<Option<RenderedNote>, MarkdownError> {
    let (frontmatter, body) = parse_frontmatter(&doc.raw);

    if !options.publish.allows(frontmatter.get("published")) {
        tracing::debug!("Skipping unpublished note {:?}", doc.rel_path);
        return Ok(None);
    }

    let body = rewrite_embeds(&body, &options.attachments);
    let content = env.markdown.render(&body)?;

    let slug = note_slug(doc, frontmatter.non_empty("slug"));
    let title = frontmatter.non_empty("title").unwrap_or(&slug).to_string();
    let date = frontmatter.get("date").unwrap_or_default().to_string();

    let mut context = env.base_context(
        RenderContext::new()
            .with("content", content.as_str())
            .with("title", title.as_str())
            .with("description", "")
            .with("date", date.as_str())
            .with("slug", slug.as_str()),
    );
    context.merge_frontmatter(&frontmatter);
    context.insert("date", display_date(&date));
    context.insert("datetime", date.as_str());

    let layout = if env.templates.contains(NOTE_LAYOUT) {
        NOTE_LAYOUT
    } else {
        DEFAULT_LAYOUT
    };
    let html = env.apply_layout(layout, &context, content);

    Ok(Some(RenderedNote {
        artifact: OutputArtifact {
            dest: note_output_path(&slug),
            html,
        },
        summary: NoteSummary { title, slug, date },
    }))
}

/// Order notes newest first; ties fall back to slug order.
pub fn sort_summaries(summaries: &mut [NoteSummary]) {
    summaries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
}

fn list_item(note: &NoteSummary) -> String {
    format!(
        r#"<li><a href="./{}/"><span class="note-list-date">{}</span><h2 class="note-list-title">{}</h2></a></li>"#,
        escape_html(&note.slug),
        escape_html(&display_date(&note.date)),
        escape_html(&note.title)
    )
}

/// Render `notes/index.html` from every emitted note.
///
/// Returns `None` when `template` is not registered.
pub fn render_listing(
    summaries: &[NoteSummary],
    env: &RenderEnv<'_>,
    template: &str,
) -> Option<OutputArtifact> {
    if !env.templates.contains(template) {
        tracing::info!("No '{}' template; skipping notes listing", template);
        return None;
    }

    let mut sorted = summaries.to_vec();
    sort_summaries(&mut sorted);
    let items = sorted.iter().map(list_item).collect::<Vec<_>>().join("\n");

    let context = env.base_context(RenderContext::new().with("content", items));
    let html = env.templates.render(template, &context)?;

    Some(OutputArtifact {
        dest: PathBuf::from("notes").join("index.html"),
        html,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PublishPolicy;
    use crate::data::GlobalData;
    use crate::markdown::MarkdownProcessor;
    use crate::templates::TemplateStore;

    fn with_env<T>(templates: TemplateStore, f: impl FnOnce(&RenderEnv<'_>) -> T) -> T {
        let data = GlobalData::default();
        let markdown = MarkdownProcessor::new();
        let env = RenderEnv {
            templates: &templates,
            data: &data,
            markdown: &markdown,
            year: 2024,
        };
        f(&env)
    }

    fn summary(slug: &str, date: &str) -> NoteSummary {
        NoteSummary {
            title: slug.to_uppercase(),
            slug: slug.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn test_rewrite_embeds() {
        let body = "Intro\n\n![[Pasted Image 1.png]]\n\n![[diagram.svg|The diagram]]";
        assert_eq!(
            rewrite_embeds(body, "attachments"),
            "Intro\n\n![](../attachments/pasted-image-1.png)\n\n![The diagram](../attachments/diagram.svg)"
        );
    }

    #[test]
    fn test_embed_references() {
        let refs = embed_references("![[a b.png]] text ![[c.jpg|alt]] [[not an embed]]");
        assert_eq!(refs, vec!["a b.png", "c.jpg"]);
    }

    #[test]
    fn test_slug_defaults_to_file_name() {
        let doc = Document::new("My First Post.md", "");
        assert_eq!(note_slug(&doc, None), "my-first-post");
        assert_eq!(note_slug(&doc, Some("custom")), "custom");
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-01-02"), "January 2, 2024");
        assert_eq!(display_date("2024-06-01T10:00:00"), "June 1, 2024");
        assert_eq!(display_date("someday"), "someday");
        assert_eq!(display_date(""), "");
    }

    #[test]
    fn test_note_renders_with_note_layout() {
        let templates: TemplateStore = [
            ("note", "<h1>{{title}}</h1><time datetime=\"{{datetime}}\">{{date}}</time>{{{content}}}"),
            ("default", "DEFAULT"),
        ]
        .into_iter()
        .collect();
        let doc = Document::new("My First Post.md", "---\ndate: 2024-01-02\n---\n![[Shot 1.png]]");

        let note = with_env(templates, |env| render_note(&doc, env, &NotesConfig::default()))
            .unwrap()
            .unwrap();

        assert_eq!(note.artifact.dest, PathBuf::from("notes/my-first-post/index.html"));
        assert_eq!(
            note.artifact.html,
            "<h1>my-first-post</h1><time datetime=\"2024-01-02\">January 2, 2024</time>\
             <p><img src=\"../attachments/shot-1.png\" alt=\"\" /></p>\n"
        );
        assert_eq!(note.summary, summary_with("my-first-post", "my-first-post", "2024-01-02"));
    }

    fn summary_with(title: &str, slug: &str, date: &str) -> NoteSummary {
        NoteSummary {
            title: title.to_string(),
            slug: slug.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn test_note_falls_back_to_default_layout() {
        let templates: TemplateStore = [("default", "<main>{{title}}</main>")].into_iter().collect();
        let doc = Document::new("a.md", "---\ntitle: Hello\nslug: hi\n---\nbody");

        let note = with_env(templates, |env| render_note(&doc, env, &NotesConfig::default()))
            .unwrap()
            .unwrap();
        assert_eq!(note.artifact.dest, PathBuf::from("notes/hi/index.html"));
        assert_eq!(note.artifact.html, "<main>Hello</main>");
    }

    #[test]
    fn test_explicit_empty_title_renders_empty() {
        let templates: TemplateStore = [("note", "<h1>{{title}}</h1>")].into_iter().collect();
        let doc = Document::new("Quiet Note.md", "---\ntitle:\n---\nbody");

        let note = with_env(templates, |env| render_note(&doc, env, &NotesConfig::default()))
            .unwrap()
            .unwrap();
        assert_eq!(note.artifact.html, "<h1></h1>");
        assert_eq!(note.summary.title, "quiet-note");
    }

    #[test]
    fn test_publish_policy_skips() {
        let doc = Document::new("draft.md", "---\npublished: false\n---\nbody");
        let plain = Document::new("plain.md", "body");
        let require = NotesConfig {
            publish: PublishPolicy::Require,
            ..NotesConfig::default()
        };

        with_env(TemplateStore::default(), |env| {
            assert!(render_note(&doc, env, &NotesConfig::default()).unwrap().is_none());
            assert!(render_note(&plain, env, &NotesConfig::default()).unwrap().is_some());
            assert!(render_note(&plain, env, &require).unwrap().is_none());
        });
    }

    #[test]
    fn test_listing_sorted_newest_first() {
        let templates: TemplateStore = [("notes-listing", "<ul>{{{content}}}</ul>")].into_iter().collect();
        let notes = vec![
            summary("a", "2024-01-01"),
            summary("b", "2024-06-01"),
            summary("c", "2023-12-31"),
        ];

        let listing = with_env(templates, |env| render_listing(&notes, env, "notes-listing")).unwrap();
        assert_eq!(listing.dest, PathBuf::from("notes/index.html"));

        let b = listing.html.find("June 1, 2024").unwrap();
        let a = listing.html.find("January 1, 2024").unwrap();
        let c = listing.html.find("December 31, 2023").unwrap();
        assert!(b < a && a < c);
        assert!(listing.html.contains(
            r#"<li><a href="./b/"><span class="note-list-date">June 1, 2024</span><h2 class="note-list-title">B</h2></a></li>"#
        ));
    }

    #[test]
    fn test_listing_skipped_without_template() {
        let notes = vec![summary("a", "2024-01-01")];
        assert!(with_env(TemplateStore::default(), |env| render_listing(&notes, env, "notes-listing")).is_none());
    }
}
