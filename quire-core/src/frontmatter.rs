//! Frontmatter parsing from page and note sources.
//!
//! The block is a flat `key: value` list fenced by `---` lines. Parsing never
//! fails: anything that does not look like a leading block is body content.

use crate::models::Frontmatter;
use regex::Regex;
use std::sync::OnceLock;

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n(.*))?\z").unwrap()
    })
}

/// Parse frontmatter from raw document text
///
/// Returns a tuple of (frontmatter, body).
/// If no leading block is present, returns empty frontmatter with the full content as body.
///
/// # Example
///
/// ```
/// use quire_core::frontmatter::parse_frontmatter;
///
/// let content = "---\ntitle: \"My Post\"\ndate: 2025-01-01\n---\n# Hello World\n";
///
/// let (fm, body) = parse_frontmatter(content);
/// assert_eq!(fm.get("title"), Some("My Post"));
/// assert_eq!(fm.get("date"), Some("2025-01-01"));
/// assert_eq!(body, "# Hello World\n");
/// ```
pub fn parse_frontmatter(content: &str) -> (Frontmatter, String) {
    let Some(captures) = frontmatter_regex().captures(content) else {
        return (Frontmatter::default(), content.to_string());
    };

    let block = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());

    let mut frontmatter = Frontmatter::default();
    for line in block.lines() {
        if let Some((key, value)) = parse_line(line) {
            frontmatter.insert(key, value);
        }
    }

    (frontmatter, body.to_string())
}

/// Split a `key: value` line on its first colon.
fn parse_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), strip_quotes(value.trim()).to_string()))
}

/// Strip one layer of matching `"` or `'` quotes.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
