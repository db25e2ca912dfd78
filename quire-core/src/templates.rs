//! Layout templates and flat `{{name}}` / `{{{name}}}` substitution.
//!
//! This is deliberately not a template language: there are no conditionals,
//! loops or nested lookups. A placeholder names one context key and unknown
//! keys render as the empty string.

use crate::models::Frontmatter;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Leading character that marks a layout file living among pages
pub const TEMPLATE_MARKER: char = '_';

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Named layout strings, loaded once per build and read-only afterwards
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: HashMap<String, String>,
}

impl TemplateStore {
    /// Load every `.html` file directly inside `dir`.
    ///
    /// With `marker_only`, files not starting with [`TEMPLATE_MARKER`] are
    /// skipped; this is how layouts share a directory with pages. The
    /// registered name drops the extension and one leading marker. A missing
    /// directory yields an empty store.
    pub fn load(dir: &Path, marker_only: bool) -> Result<Self, TemplateError> {
        let mut templates = HashMap::new();
        if !dir.is_dir() {
            tracing::debug!("Templates directory {:?} not found", dir);
            return Ok(Self { templates });
        }

        let entries = fs::read_dir(dir).map_err(|source| TemplateError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| TemplateError::Read {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if marker_only && !stem.starts_with(TEMPLATE_MARKER) {
                continue;
            }

            let name = stem.strip_prefix(TEMPLATE_MARKER).unwrap_or(stem).to_string();
            let text = fs::read_to_string(&path).map_err(|source| TemplateError::Read {
                path: path.clone(),
                source,
            })?;
            tracing::debug!("Loaded template '{}' from {:?}", name, path);
            templates.insert(name, text);
        }

        Ok(Self { templates })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Render the named template, or `None` when it is not registered
    pub fn render(&self, name: &str, context: &RenderContext) -> Option<String> {
        self.get(name).map(|template| render_template(template, context))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            templates: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Key/value data for one render, layered by insertion order.
///
/// Later inserts override earlier ones, so callers build it as
/// built-ins, then global data, then page frontmatter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    values: BTreeMap<String, Value>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style [`RenderContext::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Layer a set of structured values over the current ones
    pub fn merge<'a>(&mut self, values: impl IntoIterator<Item = (&'a String, &'a Value)>) {
        for (key, value) in values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Layer frontmatter strings over the current values
    pub fn merge_frontmatter(&mut self, frontmatter: &Frontmatter) {
        for (key, value) in frontmatter.iter() {
            self.values.insert(key.clone(), Value::String(value.clone()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Placeholder text for `key`: empty when absent
    pub fn lookup(&self, key: &str) -> String {
        self.values.get(key).map(stringify).unwrap_or_default()
    }
}

/// Stringify a context value for substitution.
///
/// Strings are verbatim, null is empty, arrays and objects are compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Escape `&`, `<` and `>` for HTML text
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

static RAW_REGEX: OnceLock<Regex> = OnceLock::new();
static ESCAPED_REGEX: OnceLock<Regex> = OnceLock::new();

fn raw_regex() -> &'static Regex {
    RAW_REGEX.get_or_init(|| Regex::new(r"\{\{\{\s*(\w+)\s*\}\}\}").unwrap())
}

fn escaped_regex() -> &'static Regex {
    ESCAPED_REGEX.get_or_init(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap())
}

/// Substitute placeholders in `template` from `context`.
///
/// Two passes, in order: `{{{name}}}` inserts the value verbatim, then
/// `{{name}}` inserts it HTML escaped. The second pass runs over the output
/// of the first, so `{{name}}` inside a raw value is substituted too.
///
/// ```
/// use quire_core::templates::{render_template, RenderContext};
///
/// let ctx = RenderContext::new().with("x", "<b>");
/// assert_eq!(render_template("{{{x}}}", &ctx), "<b>");
/// assert_eq!(render_template("{{x}}", &ctx), "&lt;b&gt;");
/// assert_eq!(render_template("[{{missing}}]", &ctx), "[]");
/// ```
pub fn render_template(template: &str, context: &RenderContext) -> String {
    let raw = raw_regex().replace_all(template, |caps: &Captures| context.lookup(&caps[1]));
    escaped_regex()
        .replace_all(&raw, |caps: &Captures| escape_html(&context.lookup(&caps[1])))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_raw_and_escaped() {
        let ctx = RenderContext::new().with("x", "<b>");
        assert_eq!(render_template("{{{x}}}", &ctx), "<b>");
        assert_eq!(render_template("{{x}}", &ctx), "&lt;b&gt;");
        assert_eq!(render_template("{{ x }} {{{ x }}}", &ctx), "&lt;b&gt; <b>");
    }

    #[test]
    fn test_ampersand_escaped_first() {
        let ctx = RenderContext::new().with("q", "a & <c>");
        assert_eq!(render_template("{{q}}", &ctx), "a &amp; &lt;c&gt;");
    }

    #[test]
    fn test_unknown_placeholder_is_empty() {
        let ctx = RenderContext::new();
        assert_eq!(render_template("<p>{{missing}}</p>", &ctx), "<p></p>");
        assert_eq!(render_template("<p>{{{missing}}}</p>", &ctx), "<p></p>");
    }

    #[test]
    fn test_non_identifier_left_alone() {
        let ctx = RenderContext::new().with("a", "1");
        assert_eq!(render_template("{{a.b}} {{ }} {a}", &ctx), "{{a.b}} {{ }} {a}");
    }

    #[test]
    fn test_escaped_pass_runs_over_raw_output() {
        let ctx = RenderContext::new()
            .with("content", "<p>{{title}}</p>")
            .with("title", "Home & Away");
        assert_eq!(render_template("{{{content}}}", &ctx), "<p>Home &amp; Away</p>");
        assert_eq!(
            render_template("{{{content}}}|{{title}}", &ctx),
            "<p>Home &amp; Away</p>|Home &amp; Away"
        );
    }

    #[test]
    fn test_raw_placeholder_in_value_is_not_expanded_again() {
        let ctx = RenderContext::new()
            .with("content", "{{{title}}}")
            .with("title", "<b>");
        assert_eq!(render_template("{{{content}}}", &ctx), "{&lt;b&gt;}");
    }

    #[test]
    fn test_stringify_values() {
        let ctx = RenderContext::new()
            .with("year", 2024)
            .with("flag", true)
            .with("none", Value::Null)
            .with("site", json!({"name": "Acme"}));
        assert_eq!(render_template("{{year}} {{flag}} [{{none}}]", &ctx), "2024 true []");
        assert_eq!(render_template("{{{site}}}", &ctx), r#"{"name":"Acme"}"#);
    }

    #[test]
    fn test_layering_order() {
        let global: BTreeMap<String, Value> =
            [("site".to_string(), json!({"name": "Acme"})), ("title".to_string(), json!("Global"))]
                .into_iter()
                .collect();
        let fm: Frontmatter = [("title", "Home")].into_iter().collect();

        let mut ctx = RenderContext::new().with("title", "").with("content", "<p>hi</p>");
        ctx.merge(&global);
        ctx.merge_frontmatter(&fm);

        assert_eq!(ctx.get("site"), Some(&json!({"name": "Acme"})));
        assert_eq!(ctx.lookup("title"), "Home");
        assert_eq!(ctx.lookup("content"), "<p>hi</p>");
    }

    #[test]
    fn test_load_marker_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("_default.html"), "<main>{{{content}}}</main>").unwrap();
        fs::write(dir.path().join("_note.html"), "<article>{{{content}}}</article>").unwrap();
        fs::write(dir.path().join("about.html"), "<p>page</p>").unwrap();
        fs::write(dir.path().join("_readme.txt"), "ignored").unwrap();

        let store = TemplateStore::load(dir.path(), true).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.contains("default"));
        assert!(store.contains("note"));
        assert!(!store.contains("about"));
    }

    #[test]
    fn test_load_dedicated_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("default.html"), "a").unwrap();
        fs::write(dir.path().join("_note.html"), "b").unwrap();

        let store = TemplateStore::load(dir.path(), false).unwrap();
        assert_eq!(store.get("default"), Some("a"));
        assert_eq!(store.get("note"), Some("b"));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let store = TemplateStore::load(&dir.path().join("nope"), true).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.render("default", &RenderContext::new()), None);
    }
}
