//! Rendering capability used by template records.

use crate::Result;
use serde_json::Value;

/// How rendered output is escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// No escaping (subjects, plain text).
    Text,
    /// HTML auto-escaping of substituted values.
    Html,
}

/// Renders template text against a context mapping.
///
/// Implementations must support `{{ a.b }}` attribute access and report
/// malformed input as [`TemplateError::Syntax`](crate::TemplateError::Syntax).
pub trait TemplateEngine: Send + Sync {
    /// Render `source` with `context` (normally a JSON object).
    fn render_str(&self, source: &str, context: &Value, format: OutputFormat) -> Result<String>;

    /// Render the base layout at `path` with the already rendered `content`
    /// exposed unescaped as `content`, alongside the entries of `context`.
    fn render_layout(&self, path: &str, content: &str, context: &Value) -> Result<String>;
}
