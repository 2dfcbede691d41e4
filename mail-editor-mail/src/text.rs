//! Plain-text alternatives derived from HTML bodies.

use once_cell::sync::Lazy;
use regex::Regex;

static INVISIBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(head|style|script)\b[^>]*>.*?</(head|style|script)\s*>").unwrap()
});

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").unwrap());

/// Remove markup from `html`, keeping the text.
///
/// `<head>`, `<style>` and `<script>` elements are dropped with their
/// content. Entities are left as they are.
pub fn strip_tags(html: &str) -> String {
    let text = INVISIBLE.replace_all(html, "");
    let text = TAG.replace_all(&text, "");
    BLANK_LINES.replace_all(text.trim(), "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>Jane</b></p>"), "Hello Jane");
        assert_eq!(strip_tags("no markup"), "no markup");
    }

    #[test]
    fn test_strip_drops_style_and_head() {
        let html = "<html><head><title>T</title><style>p { color: red; }</style></head>\
                    <body><script>alert(1)</script><p>Body</p></body></html>";
        assert_eq!(strip_tags(html), "Body");
    }

    #[test]
    fn test_collapses_blank_lines() {
        assert_eq!(strip_tags("<p>a</p>\n\n\n\n<p>b</p>"), "a\n\nb");
    }
}
