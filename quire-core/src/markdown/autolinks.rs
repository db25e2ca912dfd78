//! Bare URL linking (`https://example.com`, `www.example.com`).

use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};
use regex::Regex;
use std::sync::OnceLock;

static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"(?:https?://|www\.)[^\s<>]+").unwrap())
}

/// Transformer wrapping bare URLs in text with links
pub struct AutolinkTransformer;

impl AutolinkTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Link URLs found in text events outside code blocks, links and images
    pub fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut result = Vec::with_capacity(events.len());
        let mut iter = events.into_iter().peekable();
        let mut in_code_block = false;
        let mut link_depth = 0usize;

        while let Some(event) = iter.next() {
            match event {
                Event::Start(Tag::CodeBlock(_)) => {
                    in_code_block = true;
                    result.push(event);
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    result.push(event);
                }
                Event::Start(Tag::Link { .. } | Tag::Image { .. }) => {
                    link_depth += 1;
                    result.push(event);
                }
                Event::End(TagEnd::Link | TagEnd::Image) => {
                    link_depth = link_depth.saturating_sub(1);
                    result.push(event);
                }
                Event::Text(text) if !in_code_block && link_depth == 0 => {
                    // Smart punctuation splits text, so merge neighbours first
                    let mut merged = text.into_string();
                    while let Some(Event::Text(next)) = iter.peek() {
                        merged.push_str(next);
                        iter.next();
                    }
                    link_text(&merged, &mut result);
                }
                other => result.push(other),
            }
        }

        result
    }
}

impl Default for AutolinkTransformer {
    fn default() -> Self {
        Self::new()
    }
}

fn link_text(text: &str, out: &mut Vec<Event<'_>>) {
    let mut last = 0;
    for m in url_regex().find_iter(text) {
        let url = trim_trailing(m.as_str());
        if url.len() <= "www.".len() {
            continue;
        }
        if m.start() > last {
            out.push(boxed_text(&text[last..m.start()]));
        }

        let href = if url.starts_with("www.") {
            format!("http://{url}")
        } else {
            url.to_string()
        };
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::Boxed(href.into_boxed_str()),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(boxed_text(url));
        out.push(Event::End(TagEnd::Link));

        last = m.start() + url.len();
    }

    if last < text.len() {
        out.push(boxed_text(&text[last..]));
    }
}

/// Drop sentence punctuation that follows a URL.
fn trim_trailing(url: &str) -> &str {
    let mut url = url;
    loop {
        let trimmed = url.trim_end_matches(['.', ',', ';', ':', '!', '?', '"', '\'']);
        let trimmed = if trimmed.ends_with(')') && !trimmed.contains('(') {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

fn boxed_text<'a>(text: &str) -> Event<'a> {
    Event::Text(CowStr::Boxed(text.to_string().into_boxed_str()))
}
