//! Text node payload and hashtag parsing.

use serde::{Deserialize, Serialize};

/// Free-form text body (markdown is rendered by the host, not here).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Hashtags in the body, lowercased, in order of first appearance.
    pub fn hashtags(&self) -> Vec<String> {
        extract_hashtags(&self.text)
    }

    /// Whether the body carries the given tag (with or without a leading `#`).
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = normalize_tag(tag);
        self.hashtags().iter().any(|t| *t == wanted)
    }
}

/// Strip a leading `#` and lowercase.
pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_lowercase()
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '/')
}

/// Extract literal `#word` tokens.
///
/// A tag starts with `#` at the beginning of the text or after whitespace and
/// runs while characters are alphanumeric, `_`, `-` or `/`. A bare `#` (such
/// as a markdown heading marker) is not a tag, nor is `a#b`.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let at_boundary = prev.is_none_or(char::is_whitespace);
        if c == '#' && at_boundary {
            let start = i + c.len_utf8();
            let mut end = start;
            while let Some(&(j, n)) = chars.peek() {
                if !is_tag_char(n) {
                    break;
                }
                end = j + n.len_utf8();
                prev = Some(n);
                chars.next();
            }
            if end > start {
                let tag = text[start..end].to_lowercase();
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
                continue;
            }
        }
        prev = Some(c);
    }

    tags
}
