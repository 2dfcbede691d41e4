//! Processor error types.

use lol_html::errors::{RewritingError, SelectorError};
use thiserror::Error;

/// Result type for processor operations.
pub type Result<T> = std::result::Result<T, ProcessError>;

/// Processor errors.
///
/// Unresolvable images and stylesheets are not errors; they degrade the
/// output instead.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The document could not be rewritten at all.
    #[error("Malformed HTML document: {0}")]
    MalformedDocument(String),

    /// CSS inlining failed (only returned in debug mode).
    #[error("CSS inlining failed: {0}")]
    Inline(String),

    /// An element selector did not parse.
    #[error("Invalid selector: {0}")]
    Selector(String),
}

impl From<RewritingError> for ProcessError {
    fn from(err: RewritingError) -> Self {
        Self::MalformedDocument(err.to_string())
    }
}

impl From<SelectorError> for ProcessError {
    fn from(err: SelectorError) -> Self {
        Self::Selector(err.to_string())
    }
}

impl From<css_inline::InlineError> for ProcessError {
    fn from(err: css_inline::InlineError) -> Self {
        Self::Inline(err.to_string())
    }
}
