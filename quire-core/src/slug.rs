//! Slug generation for note names and attachment references.

use regex::Regex;
use std::sync::OnceLock;

static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

/// Convert a string to a URL slug
///
/// Rules:
/// - Lowercase
/// - Replace each run of whitespace with a single hyphen
///
/// Everything else is kept as-is, so file extensions survive
/// (`Cover Image.PNG` becomes `cover-image.png`).
///
/// # Examples
///
/// ```
/// use quire_core::slugify;
///
/// assert_eq!(slugify("My First Post"), "my-first-post");
/// assert_eq!(slugify("Screen  Shot.png"), "screen-shot.png");
/// ```
pub fn slugify(input: &str) -> String {
    let re = WHITESPACE_RUN.get_or_init(|| Regex::new(r"\s+").unwrap());
    re.replace_all(input, "-").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn test_whitespace_runs() {
        assert_eq!(slugify("Multiple   Spaces\tHere"), "multiple-spaces-here");
        assert_eq!(slugify("line\nbreak"), "line-break");
    }

    #[test]
    fn test_punctuation_kept() {
        assert_eq!(slugify("Pasted image 20240101.png"), "pasted-image-20240101.png");
        assert_eq!(slugify("C++ Notes"), "c++-notes");
    }

    #[test]
    fn test_empty() {
        assert_eq!(slugify(""), "");
    }
}
