//! Human-readable reports for template syntax errors.

use crate::escape::escape_html;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

const HIGHLIGHT_START: &str = ">>>>";
const HIGHLIGHT_END: &str = "<<<<";

/// A template syntax error together with the offending source.
///
/// When position information is available, `excerpt` holds the full source
/// with the failing span wrapped in `>>>>`/`<<<<` and every line numbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxDiagnostic {
    /// Error message from the parser, prefixed with `TemplateSyntaxError: `.
    pub message: String,
    /// 1-based line of the error, if known.
    pub line: Option<usize>,
    /// Byte range of the failing span, if known.
    pub span: Option<Range<usize>>,
    /// Numbered source with the failing span delimited.
    pub excerpt: Option<String>,
}

impl SyntaxDiagnostic {
    /// Build a diagnostic for `source`.
    ///
    /// A byte `span` is preferred; without one the whole of `line` is
    /// highlighted; without either there is no excerpt.
    pub fn new(
        message: impl AsRef<str>,
        source: &str,
        line: Option<usize>,
        span: Option<Range<usize>>,
    ) -> Self {
        let span = span
            .map(|span| clamp_span(source, span))
            .or_else(|| line.and_then(|line| line_span(source, line)));

        let excerpt = span
            .as_ref()
            .map(|span| number_lines(&highlight(source, span.clone())));

        Self {
            message: format!("TemplateSyntaxError: {}", message.as_ref()),
            line,
            span,
            excerpt,
        }
    }

    /// Render as an HTML fragment: the message in a paragraph, followed by
    /// the numbered excerpt with `<br>` line breaks.
    pub fn to_html(&self) -> String {
        let mut html = format!("<p>{}</p>", escape_html(&self.message));

        if let Some(excerpt) = &self.excerpt {
            let lines: Vec<String> = excerpt
                .lines()
                .map(escape_html)
                .collect();
            html.push_str("<p>");
            html.push_str(&lines.join("<br>"));
            html.push_str("</p>");
        }

        html
    }
}

impl fmt::Display for SyntaxDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(excerpt) = &self.excerpt {
            write!(f, "\n\n{}", excerpt)?;
        }
        Ok(())
    }
}

/// Clamp a byte range to the source and to char boundaries.
fn clamp_span(source: &str, span: Range<usize>) -> Range<usize> {
    let mut end = span.end.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let mut start = span.start.min(end);
    while !source.is_char_boundary(start) {
        start -= 1;
    }
    start..end
}

/// Byte range of the 1-based `line`, excluding its line terminator.
fn line_span(source: &str, line: usize) -> Option<Range<usize>> {
    let mut offset = 0;
    for (idx, text) in source.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            let content = text.trim_end_matches(['\n', '\r']);
            return Some(offset..offset + content.len());
        }
        offset += text.len();
    }
    // an error reported on the line after a trailing newline
    (line >= 1 && offset == source.len()).then_some(offset..offset)
}

fn highlight(source: &str, span: Range<usize>) -> String {
    format!(
        "{}{}{}{}{}",
        &source[..span.start],
        HIGHLIGHT_START,
        &source[span.clone()],
        HIGHLIGHT_END,
        &source[span.end..]
    )
}

/// Prefix each line with its zero-padded number (`01. `, `02. `, ...).
fn number_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let width = lines.len().max(1).to_string().len();

    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| format!("{:0width$}. {}", idx + 1, line, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_highlight() {
        let diag = SyntaxDiagnostic::new("unexpected `bar`", "Hi {{ foo bar }}", Some(1), Some(10..13));

        assert_eq!(diag.message, "TemplateSyntaxError: unexpected `bar`");
        assert_eq!(diag.excerpt.as_deref(), Some("1. Hi {{ foo >>>>bar<<<< }}"));
    }

    #[test]
    fn test_line_fallback_and_numbering() {
        let source = (1..=10)
            .map(|n| format!("line {}", n))
            .collect::<Vec<_>>()
            .join("\n");
        let diag = SyntaxDiagnostic::new("bad", &source, Some(3), None);
        let excerpt = diag.excerpt.unwrap();

        assert!(excerpt.starts_with("01. line 1\n"));
        assert!(excerpt.contains("03. >>>>line 3<<<<"));
        assert!(excerpt.ends_with("10. line 10"));
    }

    #[test]
    fn test_empty_span_at_end() {
        let diag = SyntaxDiagnostic::new("unexpected end of input", "Hi {{ id", None, Some(8..20));

        assert_eq!(diag.span, Some(8..8));
        assert_eq!(diag.excerpt.as_deref(), Some("1. Hi {{ id>>>><<<<"));
    }

    #[test]
    fn test_without_position() {
        let diag = SyntaxDiagnostic::new("boom", "{{ x", None, None);
        assert!(diag.excerpt.is_none());
        assert_eq!(diag.to_string(), "TemplateSyntaxError: boom");
    }

    #[test]
    fn test_to_html_escapes() {
        let diag = SyntaxDiagnostic::new("bad <tag>", "<p>{{ x", Some(1), None);
        let html = diag.to_html();

        assert!(html.starts_with("<p>TemplateSyntaxError: bad &lt;tag&gt;</p>"));
        assert!(html.contains("1. &gt;&gt;&gt;&gt;&lt;p&gt;{{ x&lt;&lt;&lt;&lt;"));
    }

    #[test]
    fn test_multibyte_boundaries() {
        let diag = SyntaxDiagnostic::new("bad", "héllo {{", None, Some(2..3));
        assert_eq!(diag.span, Some(1..3));
    }
}
